//! Test data generators for synthetic gridded and swath variables.
//!
//! These generators create predictable, verifiable patterns so tests can
//! check that values land in the right band and cell.

use ndarray::{ArrayD, IxDyn};

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`
///
/// # Returns
///
/// A `Vec<f32>` in row-major order (row 0 first, then row 1, etc.)
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);
/// assert_eq!(grid[10], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}

/// A `(height, width)` array of [`create_test_grid`] values plus `offset`.
pub fn grid_array(height: usize, width: usize, offset: f32) -> ArrayD<f32> {
    let data = create_test_grid(width, height)
        .into_iter()
        .map(|v| v + offset)
        .collect();
    // Length matches the shape by construction.
    ArrayD::from_shape_vec(IxDyn(&[height, width]), data)
        .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&[height, width])))
}

/// Line and node index fields of a full `lines x nodes` swath, in scan
/// order, with the float noise real EPS products carry.
///
/// Indices start at 1. Odd observations are nudged just above the integer
/// and even ones just below, so gridding must round rather than truncate.
///
/// ```
/// use test_utils::swath_indices;
///
/// let (lines, nodes) = swath_indices(2, 3);
/// assert_eq!(lines.len(), 6);
/// assert_eq!(lines[0].round(), 1.0);
/// assert_eq!(nodes[5].round(), 3.0);
/// ```
pub fn swath_indices(lines: usize, nodes: usize) -> (Vec<f64>, Vec<f64>) {
    let mut line_idx = Vec::with_capacity(lines * nodes);
    let mut node_idx = Vec::with_capacity(lines * nodes);

    for (i, (line, node)) in (1..=lines)
        .flat_map(|l| (1..=nodes).map(move |n| (l, n)))
        .enumerate()
    {
        let noise = if i % 2 == 0 { -1e-7 } else { 1e-7 };
        line_idx.push(line as f64 + noise);
        node_idx.push(node as f64 - noise);
    }

    (line_idx, node_idx)
}

/// Observation values `offset, offset + 1, ...` for a swath of `n` points.
pub fn swath_values(n: usize, offset: f32) -> Vec<f32> {
    (0..n).map(|i| offset + i as f32).collect()
}

/// Longitudes and latitudes of `n` observations spread over `bbox`
/// (`[min_lon, min_lat, max_lon, max_lat]`), corners included.
pub fn swath_lon_lat(n: usize, bbox: [f64; 4]) -> (Vec<f32>, Vec<f32>) {
    let [min_lon, min_lat, max_lon, max_lat] = bbox;
    let step = |i: usize, lo: f64, hi: f64| {
        if n < 2 {
            lo as f32
        } else {
            (lo + (hi - lo) * i as f64 / (n - 1) as f64) as f32
        }
    };
    (0..n)
        .map(|i| (step(i, min_lon, max_lon), step(i, min_lat, max_lat)))
        .unzip()
}
