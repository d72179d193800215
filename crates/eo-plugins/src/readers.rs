//! The set of product readers available to the adapters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use native_parser::ProductReader;

use crate::error::{PluginError, Result};
use crate::family::ProductFamily;

/// Product readers keyed by [`ProductReader::name`].
///
/// Adapters look their family's reader up at use time, so a missing reader
/// only affects the families that need it.
#[derive(Clone, Default)]
pub struct ReaderSet {
    readers: BTreeMap<String, Arc<dyn ProductReader>>,
}

impl ReaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Readers shipped with this crate: the NetCDF OLCI readers when the
    /// `netcdf` feature is enabled, nothing otherwise.
    pub fn with_builtin_readers() -> Self {
        #[allow(unused_mut)]
        let mut set = Self::new();
        #[cfg(feature = "netcdf")]
        {
            use native_parser::{OlciLevel, OlciNetcdfReader};
            set.insert(Arc::new(OlciNetcdfReader::new(OlciLevel::L1b)));
            set.insert(Arc::new(OlciNetcdfReader::new(OlciLevel::L2)));
        }
        set
    }

    /// Add a reader, replacing one with the same name.
    pub fn with_reader(mut self, reader: Arc<dyn ProductReader>) -> Self {
        self.insert(reader);
        self
    }

    pub fn insert(&mut self, reader: Arc<dyn ProductReader>) {
        self.readers.insert(reader.name().to_string(), reader);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ProductReader>> {
        self.readers.get(name)
    }

    /// The reader decoding `family`.
    pub fn for_family(&self, family: ProductFamily) -> Result<&Arc<dyn ProductReader>> {
        let name = family.reader_name();
        self.get(name)
            .ok_or_else(|| PluginError::ReaderUnavailable(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.readers.keys().map(String::as_str)
    }
}

impl fmt::Debug for ReaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
