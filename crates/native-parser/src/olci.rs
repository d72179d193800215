//! OLCI SAFE product layout.
//!
//! Each OLCI band lives in its own NetCDF file inside the `.SEN3` directory.
//! Level-1B ships top-of-atmosphere radiances (`Oa01_radiance.nc`), Level-2
//! water products ship reflectances (`Oa01_reflectance.nc`). Flag variables
//! have their own files. Sun and view angles sit on a coarser tie-point grid
//! in `tie_geometries.nc`.

use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::error::{NativeError, NativeResult};

/// File holding the tie-point sun and view angles.
pub const TIE_GEOMETRIES_FILE: &str = "tie_geometries.nc";

/// Angle bands and their tie-point variables.
pub const ANGLE_BANDS: [(&str, &str); 4] = [
    ("solar_zenith_angle", "SZA"),
    ("solar_azimuth_angle", "SAA"),
    ("satellite_zenith_angle", "OZA"),
    ("satellite_azimuth_angle", "OAA"),
];

/// Processing level of an OLCI product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OlciLevel {
    L1b,
    L2,
}

impl OlciLevel {
    /// Suffix of per-band measurement files.
    pub fn band_suffix(&self) -> &'static str {
        match self {
            OlciLevel::L1b => "radiance",
            OlciLevel::L2 => "reflectance",
        }
    }
}

/// Where a band is stored: file name within the product plus variable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandLocation {
    pub file: String,
    pub variable: String,
}

/// Map a band name to its file and variable for the given level.
///
/// Spectral bands are `Oa01`..`Oa21`. `quality_flags` is Level-1B only,
/// `mask` (the WQSF flag word) is Level-2 only. Angles exist at both levels.
pub fn band_location(level: OlciLevel, band: &str) -> Option<BandLocation> {
    if is_spectral_band(band) {
        let name = format!("{band}_{}", level.band_suffix());
        return Some(BandLocation {
            file: format!("{name}.nc"),
            variable: name,
        });
    }

    if let Some((_, variable)) = ANGLE_BANDS.iter().find(|(name, _)| *name == band) {
        return Some(BandLocation {
            file: TIE_GEOMETRIES_FILE.to_string(),
            variable: variable.to_string(),
        });
    }

    match (level, band) {
        (OlciLevel::L1b, "quality_flags") => Some(BandLocation {
            file: "qualityFlags.nc".to_string(),
            variable: "quality_flags".to_string(),
        }),
        (OlciLevel::L2, "mask") => Some(BandLocation {
            file: "wqsf.nc".to_string(),
            variable: "WQSF".to_string(),
        }),
        _ => None,
    }
}

fn is_spectral_band(band: &str) -> bool {
    match band.strip_prefix("Oa") {
        Some(num) => {
            num.len() == 2
                && num.chars().all(|c| c.is_ascii_digit())
                && matches!(num.parse::<u8>(), Ok(1..=21))
        }
        None => false,
    }
}

/// Whether `name` is an OLCI measurement or flag file of any level.
pub fn is_olci_file(name: &str) -> bool {
    if !name.ends_with(".nc") {
        return false;
    }
    let stem = &name[..name.len() - 3];
    if matches!(stem, "qualityFlags" | "wqsf" | "tie_geometries") {
        return true;
    }
    match stem.split_once('_') {
        Some((band, suffix)) => {
            is_spectral_band(band) && matches!(suffix, "radiance" | "reflectance")
        }
        None => false,
    }
}

pub fn is_angle_band(band: &str) -> bool {
    ANGLE_BANDS.iter().any(|(name, _)| *name == band)
}

/// Full-grid shape of a tie-point grid subsampled every `al` rows and `ac`
/// columns.
pub fn tie_point_shape(tie: (usize, usize), al: usize, ac: usize) -> (usize, usize) {
    let expand = |n: usize, step: usize| if n == 0 { 0 } else { (n - 1) * step.max(1) + 1 };
    (expand(tie.0, al), expand(tie.1, ac))
}

/// Bilinear expansion of a tie-point grid onto the full image grid.
pub fn expand_tie_points(tie: &Array2<f32>, al: usize, ac: usize) -> Array2<f32> {
    let (rows, cols) = tie.dim();
    if rows == 0 || cols == 0 {
        return tie.clone();
    }
    let (al, ac) = (al.max(1), ac.max(1));

    // Tie index at or before `i` and the fraction towards the next one.
    let locate = |i: usize, step: usize, len: usize| {
        let i0 = (i / step).min(len - 1);
        let frac = (i - i0 * step) as f32 / step as f32;
        (i0, (i0 + 1).min(len - 1), frac)
    };

    Array2::from_shape_fn(tie_point_shape((rows, cols), al, ac), |(r, c)| {
        let (r0, r1, fr) = locate(r, al, rows);
        let (c0, c1, fc) = locate(c, ac, cols);
        let top = tie[[r0, c0]] * (1.0 - fc) + tie[[r0, c1]] * fc;
        let bottom = tie[[r1, c0]] * (1.0 - fc) + tie[[r1, c1]] * fc;
        top * (1.0 - fr) + bottom * fr
    })
}

/// Recognisable OLCI NetCDF files in a `.SEN3` directory, sorted by name.
pub fn supported_files(dir: &Path) -> NativeResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(name) = name.to_str() {
            if entry.file_type()?.is_file() && is_olci_file(name) {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Resolve the file holding `band` among `files`.
pub fn find_band_file<'a>(
    files: &'a [PathBuf],
    level: OlciLevel,
    band: &str,
) -> NativeResult<(&'a PathBuf, String)> {
    let location = band_location(level, band)
        .ok_or_else(|| NativeError::UnsupportedVariable(band.to_string()))?;

    files
        .iter()
        .find(|f| f.file_name().and_then(|n| n.to_str()) == Some(location.file.as_str()))
        .map(|f| (f, location.variable))
        .ok_or_else(|| NativeError::MissingData(format!("{} for band {band}", location.file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_location() {
        let loc = band_location(OlciLevel::L1b, "Oa08").unwrap();
        assert_eq!(loc.file, "Oa08_radiance.nc");
        assert_eq!(loc.variable, "Oa08_radiance");

        let loc = band_location(OlciLevel::L2, "Oa08").unwrap();
        assert_eq!(loc.variable, "Oa08_reflectance");

        assert_eq!(band_location(OlciLevel::L2, "mask").unwrap().variable, "WQSF");
        assert!(band_location(OlciLevel::L1b, "mask").is_none());
        assert!(band_location(OlciLevel::L2, "quality_flags").is_none());
        assert!(band_location(OlciLevel::L1b, "Oa22").is_none());
        assert!(band_location(OlciLevel::L1b, "Oa1").is_none());

        for level in [OlciLevel::L1b, OlciLevel::L2] {
            let loc = band_location(level, "solar_zenith_angle").unwrap();
            assert_eq!(loc.file, TIE_GEOMETRIES_FILE);
            assert_eq!(loc.variable, "SZA");
        }
        let loc = band_location(OlciLevel::L2, "satellite_azimuth_angle").unwrap();
        assert_eq!(loc.variable, "OAA");
    }

    #[test]
    fn test_expand_tie_points() {
        let tie = ndarray::array![[0.0_f32, 10.0], [20.0, 30.0]];
        let full = expand_tie_points(&tie, 2, 4);

        assert_eq!(full.dim(), (3, 5));
        assert_eq!(full[[0, 0]], 0.0);
        assert_eq!(full[[0, 2]], 5.0);
        assert_eq!(full[[1, 0]], 10.0);
        assert_eq!(full[[1, 2]], 15.0);
        assert_eq!(full[[2, 4]], 30.0);
    }

    #[test]
    fn test_tie_point_shape() {
        // OLCI full resolution: every row, every 64th column.
        assert_eq!(tie_point_shape((4091, 77), 1, 64), (4091, 4865));
        assert_eq!(tie_point_shape((0, 77), 1, 64), (0, 4865));
    }

    #[test]
    fn test_is_olci_file() {
        assert!(is_olci_file("Oa01_radiance.nc"));
        assert!(is_olci_file("Oa21_reflectance.nc"));
        assert!(is_olci_file("qualityFlags.nc"));
        assert!(is_olci_file("wqsf.nc"));
        assert!(is_olci_file("tie_geometries.nc"));
        assert!(!is_olci_file("geo_coordinates.nc"));
        assert!(!is_olci_file("Oa01_radiance.nc.bak"));
        assert!(!is_olci_file("xfdumanifest.xml"));
    }

    #[test]
    fn test_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["Oa02_radiance.nc", "Oa01_radiance.nc", "geo_coordinates.nc"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let files = supported_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Oa01_radiance.nc", "Oa02_radiance.nc"]);

        let (path, variable) = find_band_file(&files, OlciLevel::L1b, "Oa02").unwrap();
        assert!(path.ends_with("Oa02_radiance.nc"));
        assert_eq!(variable, "Oa02_radiance");
        assert!(matches!(
            find_band_file(&files, OlciLevel::L1b, "Oa03"),
            Err(NativeError::MissingData(_))
        ));
    }
}
