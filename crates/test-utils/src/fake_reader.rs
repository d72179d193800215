//! An in-memory [`ProductReader`] for exercising the plugins without
//! real decoders.
//!
//! The fake serves any requested variable with synthetic values and keeps
//! shared counters, so a test can hold a clone and check whether (and how
//! often) the plugin opened the product or computed pixel data.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use datacube::LazyArray;
use native_parser::{ProductReader, Scene};
use ndarray::{ArrayD, IxDyn};

use crate::generators::{grid_array, swath_indices, swath_lon_lat, swath_values};

/// Value offset between consecutive requested variables.
///
/// The variable at request position `i` holds values starting at
/// `(i + 1) * BAND_OFFSET`.
pub const BAND_OFFSET: f32 = 100_000.0;

/// Default swath footprint, `[min_lon, min_lat, max_lon, max_lat]`.
pub const SWATH_BBOX: [f64; 4] = [-10.0, 40.0, 10.0, 60.0];

#[derive(Debug, Clone)]
enum Layout {
    Grid {
        height: usize,
        width: usize,
    },
    Swath {
        lines: Arc<Vec<f64>>,
        nodes: Arc<Vec<f64>>,
        lon: Arc<Vec<f32>>,
        lat: Arc<Vec<f32>>,
    },
}

/// Synthetic reader with shared call counters.
#[derive(Debug, Clone)]
pub struct FakeReader {
    name: String,
    layout: Layout,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    shapes: BTreeMap<String, Vec<usize>>,
    missing: Vec<String>,
    failure: Option<String>,
    opens: Arc<AtomicUsize>,
    computes: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Vec<String>>>>,
}

impl FakeReader {
    fn with_layout(name: &str, layout: Layout) -> Self {
        Self {
            name: name.to_string(),
            layout,
            start_time: None,
            end_time: None,
            shapes: BTreeMap::new(),
            missing: Vec::new(),
            failure: None,
            opens: Arc::new(AtomicUsize::new(0)),
            computes: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A reader serving every variable on a `height x width` grid.
    pub fn gridded(name: &str, height: usize, width: usize) -> Self {
        Self::with_layout(name, Layout::Grid { height, width })
    }

    /// A reader serving a full `lines x nodes` swath with noisy
    /// `line_num` / `node_num` index fields.
    pub fn swath(name: &str, lines: usize, nodes: usize) -> Self {
        let (line_idx, node_idx) = swath_indices(lines, nodes);
        Self::swath_from_indices(name, line_idx, node_idx)
    }

    /// A swath reader with explicit index fields.
    pub fn swath_from_indices(name: &str, lines: Vec<f64>, nodes: Vec<f64>) -> Self {
        let (lon, lat) = swath_lon_lat(lines.len(), SWATH_BBOX);
        Self::with_layout(
            name,
            Layout::Swath {
                lines: Arc::new(lines),
                nodes: Arc::new(nodes),
                lon: Arc::new(lon),
                lat: Arc::new(lat),
            },
        )
    }

    /// Sensing times reported by every opened scene.
    pub fn with_times(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Serve `variable` with its own shape instead of the layout's.
    pub fn with_shape(mut self, variable: &str, shape: &[usize]) -> Self {
        self.shapes.insert(variable.to_string(), shape.to_vec());
        self
    }

    /// Leave `variable` out of opened scenes.
    pub fn without_variable(mut self, variable: &str) -> Self {
        self.missing.push(variable.to_string());
        self
    }

    /// Make every `open` fail with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Number of `open` calls so far, across clones.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of variables computed so far, across clones.
    pub fn compute_count(&self) -> usize {
        self.computes.load(Ordering::SeqCst)
    }

    /// Variable lists passed to `open`, oldest first.
    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn variable(&self, name: &str, position: usize) -> LazyArray {
        let offset = (position + 1) as f32 * BAND_OFFSET;

        let values = match &self.layout {
            Layout::Grid { height, width } => match self.shapes.get(name) {
                Some(shape) => shaped(shape, offset),
                None => grid_array(*height, *width, offset),
            },
            Layout::Swath {
                lines,
                nodes,
                lon,
                lat,
            } => {
                let column: Vec<f32> = match name {
                    "line_num" => lines.iter().map(|&v| v as f32).collect(),
                    "node_num" => nodes.iter().map(|&v| v as f32).collect(),
                    "lon" => lon.to_vec(),
                    "lat" => lat.to_vec(),
                    _ => swath_values(lines.len(), offset),
                };
                match self.shapes.get(name) {
                    Some(shape) => shaped(shape, offset),
                    None => ArrayD::from_shape_vec(IxDyn(&[column.len()]), column)
                        .unwrap_or_else(|_| ArrayD::zeros(IxDyn(&[0]))),
                }
            }
        };

        let values = Arc::new(values);
        let computes = self.computes.clone();
        LazyArray::new(values.shape().to_vec(), move || {
            computes.fetch_add(1, Ordering::SeqCst);
            Ok(values.as_ref().clone())
        })
    }
}

fn shaped(shape: &[usize], offset: f32) -> ArrayD<f32> {
    ArrayD::from_elem(IxDyn(shape), offset)
}

impl ProductReader for FakeReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&self, _files: &[PathBuf], variables: &[String]) -> anyhow::Result<Scene> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(variables.to_vec());
        }

        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }

        let mut scene = Scene::new().with_times(self.start_time, self.end_time);
        for (position, name) in variables.iter().enumerate() {
            if self.missing.contains(name) {
                continue;
            }
            scene.insert(name.as_str(), self.variable(name, position));
        }
        Ok(scene)
    }
}
