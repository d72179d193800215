//! The decoder seam.
//!
//! Pixel decoding of native formats (OLCI SAFE NetCDF, SEVIRI native, EPS
//! native) is done by family-specific readers behind [`ProductReader`]. The
//! collection plugins treat them as oracles: they pass the resolved files and
//! the validated variable list, and get back a [`Scene`] of deferred arrays.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use datacube::LazyArray;
use eo_common::SensingInterval;

/// A decoder able to open one kind of product.
pub trait ProductReader: Send + Sync {
    /// Reader identifier (e.g. `seviri_l1b_native`).
    fn name(&self) -> &str;

    /// Open `files`, exposing only `variables`.
    ///
    /// Implementations must not decode pixel data here: every variable is
    /// returned as a [`LazyArray`] whose values load on compute.
    fn open(&self, files: &[PathBuf], variables: &[String]) -> anyhow::Result<Scene>;
}

/// An opened product: sensing times plus named deferred variables.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    variables: Vec<(String, LazyArray)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_times(
        mut self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_time = start_time;
        self.end_time = end_time;
        self
    }

    /// Add or replace a variable.
    pub fn with_variable(mut self, name: impl Into<String>, data: LazyArray) -> Self {
        self.insert(name, data);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, data: LazyArray) {
        let name = name.into();
        match self.variables.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = data,
            None => self.variables.push((name, data)),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&LazyArray> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variable(name).is_some()
    }

    /// Variable names in the order the reader supplied them.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|(n, _)| n.as_str())
    }

    /// Sensing interval of the scene.
    pub fn interval(&self) -> SensingInterval {
        SensingInterval::new(self.start_time, self.end_time)
    }
}
