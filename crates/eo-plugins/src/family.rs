//! Product families and their naming conventions.

use std::fmt;

use eo_common::{parse_timestamp, SensingInterval};
use serde::{Deserialize, Serialize};

/// File name markers identifying SEVIRI native products.
pub const SEVIRI_MARKERS: &[&str] = &["SEVI"];

/// File name markers identifying ASCAT SOMO25 native products.
pub const SOMO25_MARKERS: &[&str] = &["ASCA_SMO", "SOMO"];

/// Suffix of OLCI SAFE product directories.
pub const SEN3_SUFFIX: &str = ".SEN3";

/// The product families the plugins understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductFamily {
    OlciL1b,
    OlciL2,
    SeviriL1b,
    Somo25L2,
}

impl ProductFamily {
    pub const ALL: [ProductFamily; 4] = [
        ProductFamily::OlciL1b,
        ProductFamily::OlciL2,
        ProductFamily::SeviriL1b,
        ProductFamily::Somo25L2,
    ];

    /// Short identifier, as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            ProductFamily::OlciL1b => "olci_l1b",
            ProductFamily::OlciL2 => "olci_l2",
            ProductFamily::SeviriL1b => "seviri_l1b",
            ProductFamily::Somo25L2 => "somo25_l2",
        }
    }

    /// Human-readable label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ProductFamily::OlciL1b => "OLCI L1B",
            ProductFamily::OlciL2 => "OLCI L2",
            ProductFamily::SeviriL1b => "SEVIRI",
            ProductFamily::Somo25L2 => "SOMO25",
        }
    }

    /// Name of the [`ProductReader`](native_parser::ProductReader) decoding this family.
    pub fn reader_name(&self) -> &'static str {
        match self {
            ProductFamily::OlciL1b => "olci_l1b",
            ProductFamily::OlciL2 => "olci_l2",
            ProductFamily::SeviriL1b => "seviri_l1b_native",
            ProductFamily::Somo25L2 => "ascat_l2_somo25_nat",
        }
    }

    /// Sensing interval encoded in a product file or directory name.
    pub fn filename_interval(&self, name: &str) -> SensingInterval {
        match self {
            // MSG3-SEVI-MSG15-0100-NA-20230101121241.885000000Z-NA.nat
            ProductFamily::SeviriL1b => {
                let nominal = name.split('-').nth(5).and_then(parse_field);
                SensingInterval::new(nominal, nominal)
            }
            // S3A_OL_1_EFR____20230105T101010_20230105T101310_...
            // ASCA_SMO_02_M01_20230101084500Z_20230101102659Z_...
            _ => {
                let fields: Vec<&str> = name.split('_').filter(|f| !f.is_empty()).collect();
                SensingInterval::new(
                    fields.get(4).copied().and_then(parse_field),
                    fields.get(5).copied().and_then(parse_field),
                )
            }
        }
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_field(field: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let field = field.split('.').next().unwrap_or(field);
    let field = field.trim_end_matches('Z');
    parse_timestamp(field).ok()
}

/// Whether a native file name belongs to SEVIRI.
pub fn is_seviri_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    has_marker(&upper, SEVIRI_MARKERS) && !has_marker(&upper, SOMO25_MARKERS)
}

/// Whether a native file name belongs to SOMO25.
pub fn is_somo25_name(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    has_marker(&upper, SOMO25_MARKERS) && !has_marker(&upper, SEVIRI_MARKERS)
}

fn has_marker(upper: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| upper.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_marker_disambiguation() {
        assert!(is_seviri_name("MSG3-SEVI-MSG15-0100-NA-20230101121241.885000000Z-NA.nat"));
        assert!(!is_somo25_name("MSG3-SEVI-MSG15-0100-NA-20230101121241.885000000Z-NA.nat"));
        assert!(is_somo25_name("ASCA_SMO_02_M01_20230101084500Z_20230101102659Z_N_O_20230101101931Z.nat"));
        assert!(!is_seviri_name("ASCA_SMO_02_M01_20230101084500Z_20230101102659Z_N_O_20230101101931Z.nat"));
        assert!(!is_seviri_name("SEVI_SOMO_mixed.nat"));
        assert!(!is_somo25_name("SEVI_SOMO_mixed.nat"));
        assert!(!is_seviri_name("random.nat"));
    }

    #[test]
    fn test_eps_filename_interval() {
        let interval = ProductFamily::Somo25L2.filename_interval(
            "ASCA_SMO_02_M01_20230101084500Z_20230101102659Z_N_O_20230101101931Z.nat",
        );
        assert_eq!(interval.start, Some(Utc.with_ymd_and_hms(2023, 1, 1, 8, 45, 0).unwrap()));
        assert_eq!(interval.end, Some(Utc.with_ymd_and_hms(2023, 1, 1, 10, 26, 59).unwrap()));
    }

    #[test]
    fn test_olci_filename_interval_skips_empty_fields() {
        let interval = ProductFamily::OlciL1b.filename_interval(
            "S3A_OL_1_EFR____20230105T101010_20230105T101310_20230105T120000_0179_094_122_2160_PS1_O_NR_002.SEN3",
        );
        assert_eq!(interval.start, Some(Utc.with_ymd_and_hms(2023, 1, 5, 10, 10, 10).unwrap()));
        assert_eq!(interval.end, Some(Utc.with_ymd_and_hms(2023, 1, 5, 10, 13, 10).unwrap()));
    }

    #[test]
    fn test_msg_filename_single_time() {
        let interval = ProductFamily::SeviriL1b
            .filename_interval("MSG3-SEVI-MSG15-0100-NA-20230101121241.885000000Z-NA.nat");
        let t = Utc.with_ymd_and_hms(2023, 1, 1, 12, 12, 41).unwrap();
        assert_eq!(interval.start, Some(t));
        assert_eq!(interval.end, Some(t));
    }

    #[test]
    fn test_unparseable_name() {
        assert!(ProductFamily::SeviriL1b.filename_interval("MSG3-SEVI-...-NA.nat").is_unknown());
        assert!(ProductFamily::OlciL2.filename_interval("product.SEN3").is_unknown());
    }
}
