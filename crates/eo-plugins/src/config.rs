//! Plugin configuration and per-family band profiles.
//!
//! Configuration is read from YAML with `${VAR}` / `${VAR:-default}`
//! substitution applied to the raw text before parsing:
//!
//! ```yaml
//! families:
//!   seviri_l1b:
//!     enabled: true
//!   somo25_l2:
//!     enabled: ${ENABLE_SOMO25:-true}
//!     profile:
//!       version: 2
//!       defaults: [sm, sm_noise]
//!       declared: [sm, sm_noise]
//!       known: [sm, sm_noise, sm_mean]
//! discovery:
//!   header_scan_bytes: 16384
//! logging:
//!   level: ${RUST_LOG:-info}
//!   format: json
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use local_collections::LoggingConfig;
use native_parser::olci::ANGLE_BANDS;
use native_parser::DEFAULT_SCAN_BYTES;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PluginError, Result};
use crate::family::ProductFamily;

/// Environment variable naming the configuration file for [`PluginConfig::from_env`].
pub const CONFIG_ENV_VAR: &str = "EO_PLUGINS_CONFIG";

// ============================================================================
// Band profiles
// ============================================================================

const OLCI_L1B_BANDS: [&str; 21] = [
    "Oa01", "Oa02", "Oa03", "Oa04", "Oa05", "Oa06", "Oa07", "Oa08", "Oa09", "Oa10", "Oa11",
    "Oa12", "Oa13", "Oa14", "Oa15", "Oa16", "Oa17", "Oa18", "Oa19", "Oa20", "Oa21",
];

/// Bands with water-leaving reflectances in OLCI Level-2 water products.
const OLCI_L2_BANDS: [&str; 16] = [
    "Oa01", "Oa02", "Oa03", "Oa04", "Oa05", "Oa06", "Oa07", "Oa08", "Oa09", "Oa10", "Oa11",
    "Oa12", "Oa16", "Oa17", "Oa18", "Oa21",
];

/// The single high-resolution visible SEVIRI channel.
pub const SEVIRI_HRV_BANDS: [&str; 1] = ["HRV"];

/// SEVIRI channels sampled on the 3 km grid.
pub const SEVIRI_3KM_BANDS: [&str; 11] = [
    "IR_016", "IR_039", "IR_087", "IR_097", "IR_108", "IR_120", "IR_134", "VIS006", "VIS008",
    "WV_062", "WV_073",
];

const SOMO25_BANDS: [&str; 17] = [
    "sm",
    "sm_noise",
    "sm_mean",
    "sm_sens",
    "sig40",
    "sig40_noise",
    "slope40",
    "slope40_noise",
    "dry_sig40",
    "wet_sig40",
    "snow_prob",
    "frozen_prob",
    "wetland",
    "topo",
    "proc_flag",
    "agg_flag",
    "corr_flag",
];

/// Versioned band lists of one product family.
///
/// - `defaults`: loaded when a request names no bands
/// - `declared`: advertised in collection descriptors
/// - `known`: every band a request may name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandProfile {
    pub version: u32,
    pub defaults: Vec<String>,
    pub declared: Vec<String>,
    pub known: Vec<String>,
}

impl BandProfile {
    /// The built-in profile of a family.
    pub fn builtin(family: ProductFamily) -> Self {
        match family {
            // Angles and flags can be requested but are not loaded by default.
            ProductFamily::OlciL1b => Self::from_lists(
                &OLCI_L1B_BANDS,
                &OLCI_L1B_BANDS,
                OLCI_L1B_BANDS
                    .iter()
                    .copied()
                    .chain(angle_bands())
                    .chain(["quality_flags"]),
            ),
            ProductFamily::OlciL2 => Self::from_lists(
                &OLCI_L2_BANDS,
                &OLCI_L2_BANDS,
                OLCI_L2_BANDS.iter().copied().chain(angle_bands()).chain(["mask"]),
            ),
            // The full channel set is advertised, but HRV lives on its own
            // grid, so the default load is the 3 km group only.
            ProductFamily::SeviriL1b => {
                let all: Vec<&str> = SEVIRI_HRV_BANDS
                    .iter()
                    .chain(SEVIRI_3KM_BANDS.iter())
                    .copied()
                    .collect();
                Self::from_lists(&SEVIRI_3KM_BANDS, &all, all.iter().copied())
            }
            ProductFamily::Somo25L2 => {
                Self::from_lists(&SOMO25_BANDS, &SOMO25_BANDS, SOMO25_BANDS.iter().copied())
            }
        }
    }

    fn from_lists<'a>(
        defaults: &[&str],
        declared: &[&str],
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            version: 1,
            defaults: owned(defaults),
            declared: owned(declared),
            known: known.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_known(&self, band: &str) -> bool {
        self.known.iter().any(|b| b == band)
    }

    /// Bands to load for a request: the requested list in order, or the
    /// defaults when none were requested. Unknown names are rejected.
    pub fn select(&self, family: ProductFamily, requested: Option<&[String]>) -> Result<Vec<String>> {
        let bands = match requested {
            Some(bands) if !bands.is_empty() => bands.to_vec(),
            _ => return Ok(self.defaults.clone()),
        };

        let mut unknown: Vec<String> = bands
            .iter()
            .filter(|b| !self.is_known(b))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();

        if !unknown.is_empty() {
            return Err(PluginError::UnknownBands {
                family: family.label(),
                unknown,
                allowed: self.known.clone(),
            });
        }

        Ok(bands)
    }

    /// Check internal consistency.
    pub fn validate(&self, family: ProductFamily) -> Result<()> {
        let fail = |msg: String| -> Result<()> {
            Err(PluginError::InvalidProfile(format!("{family}: {msg}")))
        };

        if self.known.is_empty() || self.defaults.is_empty() || self.declared.is_empty() {
            return fail("band lists must not be empty".to_string());
        }

        for (list_name, list) in [
            ("defaults", &self.defaults),
            ("declared", &self.declared),
            ("known", &self.known),
        ] {
            let mut seen = HashSet::new();
            if let Some(dup) = list.iter().find(|b| !seen.insert(b.as_str())) {
                return fail(format!("duplicate band '{dup}' in {list_name}"));
            }
        }

        for (list_name, list) in [("defaults", &self.defaults), ("declared", &self.declared)] {
            if let Some(missing) = list.iter().find(|b| !self.is_known(b)) {
                return fail(format!("{list_name} band '{missing}' is not in known"));
            }
        }

        if family == ProductFamily::SeviriL1b && mixes_seviri_grids(&self.defaults) {
            return fail("defaults mix HRV with 3 km channels".to_string());
        }

        Ok(())
    }
}

/// Whether a SEVIRI band list holds both HRV and 3 km channels.
pub(crate) fn mixes_seviri_grids(bands: &[String]) -> bool {
    let is_hrv = |b: &String| SEVIRI_HRV_BANDS.contains(&b.as_str());
    bands.iter().any(is_hrv) && bands.iter().any(|b| !is_hrv(b))
}

fn angle_bands() -> impl Iterator<Item = &'static str> {
    ANGLE_BANDS.iter().map(|(band, _)| *band)
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Plugin configuration
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub families: FamiliesConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamiliesConfig {
    #[serde(default)]
    pub olci_l1b: FamilyConfig,

    #[serde(default)]
    pub olci_l2: FamilyConfig,

    #[serde(default)]
    pub seviri_l1b: FamilyConfig,

    #[serde(default)]
    pub somo25_l2: FamilyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Replaces the built-in band profile.
    #[serde(default)]
    pub profile: Option<BandProfile>,
}

fn default_true() -> bool {
    true
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            profile: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Bytes scanned for the ASCII header of `.nat` files.
    #[serde(default = "default_header_scan_bytes")]
    pub header_scan_bytes: usize,
}

fn default_header_scan_bytes() -> usize {
    DEFAULT_SCAN_BYTES
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            header_scan_bytes: DEFAULT_SCAN_BYTES,
        }
    }
}

impl PluginConfig {
    /// Parse YAML after environment variable substitution.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: PluginConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| PluginError::InvalidConfig(format!("Failed to parse YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PluginError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_yaml_str(&content)?;
        info!(path = %path.display(), "Loaded plugin configuration");
        Ok(config)
    }

    /// Load the file named by `EO_PLUGINS_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self::from_yaml_file(path),
            _ => {
                debug!("{CONFIG_ENV_VAR} not set, using default plugin configuration");
                Ok(Self::default())
            }
        }
    }

    pub fn family(&self, family: ProductFamily) -> &FamilyConfig {
        match family {
            ProductFamily::OlciL1b => &self.families.olci_l1b,
            ProductFamily::OlciL2 => &self.families.olci_l2,
            ProductFamily::SeviriL1b => &self.families.seviri_l1b,
            ProductFamily::Somo25L2 => &self.families.somo25_l2,
        }
    }

    pub fn is_enabled(&self, family: ProductFamily) -> bool {
        self.family(family).enabled
    }

    /// Effective band profile: the configured override or the built-in one.
    pub fn profile(&self, family: ProductFamily) -> BandProfile {
        self.family(family)
            .profile
            .clone()
            .unwrap_or_else(|| BandProfile::builtin(family))
    }

    pub fn validate(&self) -> Result<()> {
        for family in ProductFamily::ALL {
            if let Some(profile) = &self.family(family).profile {
                profile.validate(family)?;
            }
        }
        if self.discovery.header_scan_bytes == 0 {
            return Err(PluginError::InvalidConfig(
                "discovery.header_scan_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Environment variable substitution
// ============================================================================

/// Expand `${VAR}` and `${VAR:-default}` references.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => {
                        return Err(PluginError::InvalidConfig(format!(
                            "Unclosed variable substitution: ${{{var_expr}"
                        )))
                    }
                }
            }

            result.push_str(&resolve_var_expr(&var_expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve `VAR` or `VAR:-default`.
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).map_err(|_| {
            PluginError::InvalidConfig(format!("Environment variable {expr} not set"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_are_valid() {
        for family in ProductFamily::ALL {
            BandProfile::builtin(family).validate(family).unwrap();
        }
    }

    #[test]
    fn test_seviri_profile_lists() {
        let profile = BandProfile::builtin(ProductFamily::SeviriL1b);
        assert_eq!(profile.declared.len(), 12);
        assert_eq!(profile.defaults.len(), 11);
        assert!(!profile.defaults.contains(&"HRV".to_string()));
        assert_eq!(profile.declared[0], "HRV");
    }

    #[test]
    fn test_select_defaults_and_order() {
        let family = ProductFamily::Somo25L2;
        let profile = BandProfile::builtin(family);
        assert_eq!(profile.select(family, None).unwrap(), profile.defaults);
        assert_eq!(profile.select(family, Some(&[][..])).unwrap(), profile.defaults);

        let requested = vec!["topo".to_string(), "sm".to_string()];
        assert_eq!(profile.select(family, Some(requested.as_slice())).unwrap(), requested);
    }

    #[test]
    fn test_select_unknown_lists_allowed() {
        let family = ProductFamily::OlciL2;
        let profile = BandProfile::builtin(family);
        let err = profile
            .select(family, Some(&["Oa13".to_string(), "Oa01".to_string()][..]))
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("\"Oa13\""));
        assert!(msg.contains("\"mask\""));
    }

    #[test]
    fn test_profile_validation_failures() {
        let family = ProductFamily::Somo25L2;
        let mut profile = BandProfile::builtin(family);
        profile.defaults.push("nope".to_string());
        assert!(profile.validate(family).is_err());

        let mut profile = BandProfile::builtin(family);
        profile.known.push("sm".to_string());
        assert!(profile.validate(family).is_err());
    }

    #[test]
    fn test_seviri_defaults_must_share_a_grid() {
        let family = ProductFamily::SeviriL1b;
        let mut profile = BandProfile::builtin(family);
        profile.defaults.insert(0, "HRV".to_string());

        let err = profile.validate(family).unwrap_err();
        assert!(err.to_string().contains("mix HRV"));

        profile.defaults = vec!["HRV".to_string()];
        assert!(profile.validate(family).is_ok());
    }

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("EO_PLUGINS_TEST_VAR", "test_value");
        let result = expand_env_vars("prefix_${EO_PLUGINS_TEST_VAR}_suffix").unwrap();
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("EO_PLUGINS_NONEXISTENT_VAR");
        let result = expand_env_vars("value_${EO_PLUGINS_NONEXISTENT_VAR:-default}_end").unwrap();
        assert_eq!(result, "value_default_end");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("EO_PLUGINS_REQUIRED_VAR");
        assert!(expand_env_vars("${EO_PLUGINS_REQUIRED_VAR}").is_err());
        assert!(expand_env_vars("${UNCLOSED").is_err());
    }

    #[test]
    fn test_yaml_with_override() {
        std::env::remove_var("EO_PLUGINS_TEST_SCAN");
        let yaml = r#"
families:
  olci_l2:
    enabled: false
  somo25_l2:
    profile:
      version: 2
      defaults: [sm]
      declared: [sm, sm_noise]
      known: [sm, sm_noise]
discovery:
  header_scan_bytes: ${EO_PLUGINS_TEST_SCAN:-4096}
logging:
  format: json
"#;
        let config = PluginConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.is_enabled(ProductFamily::OlciL2));
        assert!(config.is_enabled(ProductFamily::OlciL1b));
        assert_eq!(config.profile(ProductFamily::Somo25L2).version, 2);
        assert_eq!(config.profile(ProductFamily::SeviriL1b).version, 1);
        assert_eq!(config.discovery.header_scan_bytes, 4096);
    }

    #[test]
    fn test_yaml_invalid_profile_rejected() {
        let yaml = r#"
families:
  seviri_l1b:
    profile:
      version: 3
      defaults: [HRV]
      declared: [HRV]
      known: []
"#;
        assert!(matches!(
            PluginConfig::from_yaml_str(yaml),
            Err(PluginError::InvalidProfile(_))
        ));
    }
}
