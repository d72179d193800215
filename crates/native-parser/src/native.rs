//! Native NetCDF reading of OLCI SAFE products using the netcdf library.
//!
//! Opening a product only inspects variable dimensions. Pixel values are read
//! when a band's [`LazyArray`] is computed, with `scale_factor`, `add_offset`
//! and `_FillValue` applied at that point. Angle bands are expanded from their
//! tie-point grid to the image grid on compute.

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::Context;
use datacube::LazyArray;
use ndarray::{ArrayD, Ix2, IxDyn};
use tracing::debug;

use crate::error::{NativeError, NativeResult};
use crate::olci::{expand_tie_points, find_band_file, is_angle_band, tie_point_shape, OlciLevel};
use crate::reader::{ProductReader, Scene};
use crate::safe::SafeManifest;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even when a missing optional
/// attribute is handled on the Rust side. Safe to call more than once.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with null handlers disables automatic error
        // printing, a documented use of the call.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// [`ProductReader`] for OLCI Level-1B and Level-2 `.SEN3` products.
#[derive(Debug, Clone)]
pub struct OlciNetcdfReader {
    level: OlciLevel,
}

impl OlciNetcdfReader {
    pub fn new(level: OlciLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> OlciLevel {
        self.level
    }
}

impl ProductReader for OlciNetcdfReader {
    fn name(&self) -> &str {
        match self.level {
            OlciLevel::L1b => "olci_l1b",
            OlciLevel::L2 => "olci_l2",
        }
    }

    fn open(&self, files: &[PathBuf], variables: &[String]) -> anyhow::Result<Scene> {
        silence_hdf5_errors();

        let mut scene = Scene::new();
        if let Some(dir) = files.first().and_then(|f| f.parent()) {
            // Sensing times are optional; the manifest may be absent.
            if let Ok(manifest) = SafeManifest::read_dir(dir) {
                scene = scene.with_times(manifest.start_time, manifest.stop_time);
            }
        }

        for band in variables {
            let (path, variable) = find_band_file(files, self.level, band)?;
            let path = path.clone();

            let lazy = if is_angle_band(band) {
                let (shape, factors) = tie_point_layout(&path, &variable).with_context(|| {
                    format!("reading tie points of {band} from {}", path.display())
                })?;
                debug!(band = %band, path = %path.display(), shape = ?shape, "Opened OLCI angle");

                LazyArray::new(shape, move || {
                    read_tie_points(&path, &variable, factors)
                        .with_context(|| format!("reading {variable} from {}", path.display()))
                })
            } else {
                let shape = variable_shape(&path, &variable)
                    .with_context(|| format!("reading shape of {band} from {}", path.display()))?;
                debug!(band = %band, path = %path.display(), shape = ?shape, "Opened OLCI band");

                LazyArray::new(shape, move || {
                    read_scaled(&path, &variable)
                        .with_context(|| format!("reading {variable} from {}", path.display()))
                })
            };
            scene.insert(band.as_str(), lazy);
        }

        Ok(scene)
    }
}

fn open_file(path: &Path) -> NativeResult<netcdf::File> {
    netcdf::open(path)
        .map_err(|e| NativeError::InvalidFormat(format!("Failed to open NetCDF: {}", e)))
}

fn variable_shape(path: &Path, name: &str) -> NativeResult<Vec<usize>> {
    let file = open_file(path)?;
    let var = file
        .variable(name)
        .ok_or_else(|| NativeError::MissingData(format!("{name} variable")))?;
    Ok(var.dimensions().iter().map(|d| d.len()).collect())
}

/// Read a variable as physical values; fill values become NaN.
fn read_scaled(path: &Path, name: &str) -> NativeResult<ArrayD<f32>> {
    let file = open_file(path)?;
    let var = file
        .variable(name)
        .ok_or_else(|| NativeError::MissingData(format!("{name} variable")))?;
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

    let raw: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NativeError::InvalidFormat(format!("Failed to read {name}: {}", e)))?;

    let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
    let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
    let fill_value = get_f64_attr(&var, "_FillValue");

    let data: Vec<f32> = raw
        .iter()
        .map(|&val| {
            if Some(val) == fill_value {
                f32::NAN
            } else {
                (val * scale_factor + add_offset) as f32
            }
        })
        .collect();

    ArrayD::from_shape_vec(IxDyn(&shape), data)
        .map_err(|e| NativeError::InvalidFormat(format!("{name}: {e}")))
}

/// Row and column subsampling of the tie-point grid, from the global
/// `al_subsampling_factor` / `ac_subsampling_factor` attributes.
fn subsampling_factors(file: &netcdf::File) -> (usize, usize) {
    let factor = |name: &str| {
        file.attribute(name)
            .and_then(|attr| attr.value().ok())
            .and_then(|value| f64::try_from(value).ok())
            .filter(|f| *f >= 1.0)
            .map_or(1, |f| f as usize)
    };
    (factor("al_subsampling_factor"), factor("ac_subsampling_factor"))
}

/// Image-grid shape of a tie-point variable and its subsampling factors.
fn tie_point_layout(path: &Path, name: &str) -> NativeResult<(Vec<usize>, (usize, usize))> {
    let file = open_file(path)?;
    let var = file
        .variable(name)
        .ok_or_else(|| NativeError::MissingData(format!("{name} variable")))?;
    let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let &[rows, cols] = dims.as_slice() else {
        return Err(NativeError::InvalidFormat(format!(
            "{name} has {} dimensions, expected 2",
            dims.len()
        )));
    };

    let (al, ac) = subsampling_factors(&file);
    let (full_rows, full_cols) = tie_point_shape((rows, cols), al, ac);
    Ok((vec![full_rows, full_cols], (al, ac)))
}

fn read_tie_points(path: &Path, name: &str, (al, ac): (usize, usize)) -> NativeResult<ArrayD<f32>> {
    let tie = read_scaled(path, name)?
        .into_dimensionality::<Ix2>()
        .map_err(|e| NativeError::InvalidFormat(format!("{name}: {e}")))?;
    Ok(expand_tie_points(&tie, al, ac).into_dyn())
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_names() {
        assert_eq!(OlciNetcdfReader::new(OlciLevel::L1b).name(), "olci_l1b");
        assert_eq!(OlciNetcdfReader::new(OlciLevel::L2).name(), "olci_l2");
    }

    #[test]
    fn test_missing_band_file() {
        let reader = OlciNetcdfReader::new(OlciLevel::L1b);
        let files = vec![PathBuf::from("/nonexistent/Oa01_radiance.nc")];
        let err = reader.open(&files, &["Oa02".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Oa02_radiance.nc"));
    }
}
