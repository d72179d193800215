//! Gridding of one-dimensional swath observation streams.
//!
//! Scatterometer products deliver observations as a flat stream, each tagged
//! with the scan line and the across-track node it belongs to. This module
//! turns such a stream into a dense `(y, x)` grid where `y` is the line number
//! and `x` the node number. Cells without an observation are NaN.

use std::collections::HashSet;
use std::sync::Arc;

use ndarray::{Array2, ArrayD, Ix1};

use crate::error::{CubeError, CubeResult};
use crate::lazy::LazyArray;

/// Mapping from observation index to `(row, col)` grid cell.
#[derive(Debug, Clone)]
pub struct SwathGrid {
    lines: Vec<i64>,
    nodes: Vec<i64>,
    cells: Vec<(usize, usize)>,
}

impl SwathGrid {
    /// Build the grid from per-observation line and node numbers.
    ///
    /// Index fields are often stored as floats; they are rounded to the
    /// nearest integer (ties to even) before use. The grid axes are the sorted
    /// unique line and node numbers.
    pub fn from_indices(lines: &[f64], nodes: &[f64]) -> CubeResult<Self> {
        if lines.len() != nodes.len() {
            return Err(CubeError::ObservationCount {
                expected: lines.len(),
                actual: nodes.len(),
            });
        }

        let line_idx = round_indices("line", lines)?;
        let node_idx = round_indices("node", nodes)?;

        let unique_lines = sorted_unique(&line_idx);
        let unique_nodes = sorted_unique(&node_idx);

        let mut seen = HashSet::with_capacity(line_idx.len());
        let mut cells = Vec::with_capacity(line_idx.len());

        for (&line, &node) in line_idx.iter().zip(&node_idx) {
            if !seen.insert((line, node)) {
                return Err(CubeError::DuplicateSwathCell { line, node });
            }
            // Both searches succeed: the axes were built from these values.
            let row = unique_lines.binary_search(&line).unwrap_or_default();
            let col = unique_nodes.binary_search(&node).unwrap_or_default();
            cells.push((row, col));
        }

        Ok(Self {
            lines: unique_lines,
            nodes: unique_nodes,
            cells,
        })
    }

    /// `(y, x)` grid shape.
    pub fn shape(&self) -> (usize, usize) {
        (self.lines.len(), self.nodes.len())
    }

    /// Number of observations the grid was built from.
    pub fn observations(&self) -> usize {
        self.cells.len()
    }

    /// Line numbers labelling the `y` axis.
    pub fn y_coords(&self) -> Vec<f64> {
        self.lines.iter().map(|&v| v as f64).collect()
    }

    /// Node numbers labelling the `x` axis.
    pub fn x_coords(&self) -> Vec<f64> {
        self.nodes.iter().map(|&v| v as f64).collect()
    }

    /// Scatter one observation vector onto the grid.
    pub fn scatter(&self, values: &[f32]) -> CubeResult<Array2<f32>> {
        if values.len() != self.cells.len() {
            return Err(CubeError::ObservationCount {
                expected: self.cells.len(),
                actual: values.len(),
            });
        }

        let mut grid = Array2::from_elem(self.shape(), f32::NAN);
        for (&(row, col), &v) in self.cells.iter().zip(values) {
            grid[[row, col]] = v;
        }
        Ok(grid)
    }

    /// Defer gridding of a one-dimensional observation array until compute.
    pub fn scatter_lazy(self: &Arc<Self>, observations: &LazyArray) -> LazyArray {
        let grid = Arc::clone(self);
        let (ny, nx) = self.shape();
        observations.map(vec![ny, nx], move |obs: ArrayD<f32>| {
            let obs = obs.into_dimensionality::<Ix1>()?;
            let gridded = match obs.as_slice() {
                Some(values) => grid.scatter(values)?,
                None => grid.scatter(&obs.to_vec())?,
            };
            Ok(gridded.into_dyn())
        })
    }
}

fn round_indices(field: &str, values: &[f64]) -> CubeResult<Vec<i64>> {
    values
        .iter()
        .map(|&v| {
            if v.is_finite() {
                Ok(v.round_ties_even() as i64)
            } else {
                Err(CubeError::InvalidSwathIndex(format!("{field} index {v}")))
            }
        })
        .collect()
}

fn sorted_unique(values: &[i64]) -> Vec<i64> {
    let mut out = values.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}
