//! The labelled `(time, bands, y, x)` cube handed back to the host.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ndarray::{s, Array2, Array4, Ix2};
use tracing::debug;

use crate::error::{CubeError, CubeResult};
use crate::lazy::LazyArray;

/// Dimension order of every cube.
pub const DIMENSIONS: [&str; 4] = ["time", "bands", "y", "x"];

/// A four-dimensional labelled array with a single time step.
///
/// Band data stays deferred until [`DataCube::compute`] or
/// [`DataCube::compute_band`] is called.
#[derive(Debug, Clone)]
pub struct DataCube {
    /// Acquisition time; `None` is "not-a-time".
    time: Option<DateTime<Utc>>,
    bands: Vec<String>,
    data: Vec<LazyArray>,
    y: Vec<f64>,
    x: Vec<f64>,
    attrs: BTreeMap<String, String>,
}

impl DataCube {
    /// Stack two-dimensional band arrays along a new `bands` axis.
    ///
    /// Band order is preserved exactly. All bands must share one `(y, x)`
    /// shape. Spatial coordinates default to pixel indices.
    pub fn stack(
        time: Option<DateTime<Utc>>,
        bands: Vec<(String, LazyArray)>,
    ) -> CubeResult<Self> {
        let (first_name, first) = bands.first().ok_or(CubeError::EmptyCube)?;
        let grid = grid_shape(first_name, first)?;

        let mut names: Vec<String> = Vec::with_capacity(bands.len());
        let mut data = Vec::with_capacity(bands.len());

        for (name, array) in bands {
            if names.contains(&name) {
                return Err(CubeError::DuplicateBand(name));
            }
            let shape = grid_shape(&name, &array)?;
            if shape != grid {
                return Err(CubeError::GridMismatch {
                    band: name,
                    expected: grid,
                    actual: shape,
                });
            }
            names.push(name);
            data.push(array);
        }

        debug!(bands = ?names, y = grid.0, x = grid.1, "Stacked cube");

        Ok(Self {
            time,
            bands: names,
            data,
            y: (0..grid.0).map(|i| i as f64).collect(),
            x: (0..grid.1).map(|i| i as f64).collect(),
            attrs: BTreeMap::new(),
        })
    }

    /// Replace the `y` and `x` coordinate labels.
    pub fn with_coords(mut self, y: Vec<f64>, x: Vec<f64>) -> CubeResult<Self> {
        if y.len() != self.y.len() {
            return Err(CubeError::CoordinateLength {
                dim: "y",
                expected: self.y.len(),
                actual: y.len(),
            });
        }
        if x.len() != self.x.len() {
            return Err(CubeError::CoordinateLength {
                dim: "x",
                expected: self.x.len(),
                actual: x.len(),
            });
        }
        self.y = y;
        self.x = x;
        Ok(self)
    }

    /// Attach a free-form attribute (e.g. the reader that produced the cube).
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn dims(&self) -> [&'static str; 4] {
        DIMENSIONS
    }

    /// `[time, bands, y, x]`
    pub fn shape(&self) -> [usize; 4] {
        [1, self.bands.len(), self.y.len(), self.x.len()]
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }

    pub fn band_names(&self) -> &[String] {
        &self.bands
    }

    pub fn y_coords(&self) -> &[f64] {
        &self.y
    }

    pub fn x_coords(&self) -> &[f64] {
        &self.x
    }

    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Deferred data for one band.
    pub fn band(&self, name: &str) -> Option<&LazyArray> {
        self.bands
            .iter()
            .position(|b| b == name)
            .map(|i| &self.data[i])
    }

    /// Materialize a single band as a `(y, x)` array.
    pub fn compute_band(&self, name: &str) -> Option<CubeResult<Array2<f32>>> {
        self.band(name).map(|lazy| to_2d(name, lazy))
    }

    /// Materialize the whole cube.
    pub fn compute(&self) -> CubeResult<Array4<f32>> {
        let [t, b, ny, nx] = self.shape();
        let mut out = Array4::<f32>::zeros((t, b, ny, nx));

        for (i, (name, lazy)) in self.bands.iter().zip(&self.data).enumerate() {
            let values = to_2d(name, lazy)?;
            out.slice_mut(s![0, i, .., ..]).assign(&values);
        }

        Ok(out)
    }
}

fn grid_shape(name: &str, array: &LazyArray) -> CubeResult<(usize, usize)> {
    match array.shape() {
        [ny, nx] => Ok((*ny, *nx)),
        other => Err(CubeError::NotTwoDimensional {
            band: name.to_string(),
            ndim: other.len(),
        }),
    }
}

fn to_2d(name: &str, lazy: &LazyArray) -> CubeResult<Array2<f32>> {
    let values = lazy.compute()?;
    let ndim = values.ndim();
    values
        .into_dimensionality::<Ix2>()
        .map_err(|_| CubeError::NotTwoDimensional {
            band: name.to_string(),
            ndim,
        })
}
