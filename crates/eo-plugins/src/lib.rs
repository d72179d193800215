//! Local collection plugins for EUMETSAT and Copernicus native products.
//!
//! Three adapters plug non-standard product formats into a
//! [`LocalCollections`](local_collections::LocalCollections) host:
//!
//! | adapter               | products                                      |
//! |-----------------------|-----------------------------------------------|
//! | [`OlciCollections`]   | Sentinel-3 OLCI `.SEN3` directories, L1B / L2 |
//! | [`SeviriCollections`] | MSG SEVIRI Level-1.5 `.nat` files             |
//! | [`Somo25Collections`] | Metop ASCAT SOMO25 Level-2 `.nat` files       |
//!
//! Each adapter recognises its paths, describes them as STAC-like collection
//! descriptors and loads them as `(time, bands, y, x)` cubes. Pixel decoding
//! happens in the [`ProductReader`](native_parser::ProductReader)s of a
//! [`ReaderSet`].
//!
//! ```ignore
//! use eo_plugins::{register_all, PluginConfig, ReaderSet};
//! use local_collections::{init_logging, LocalCollections, LoadCollectionArgs};
//!
//! let config = PluginConfig::from_env()?;
//! init_logging(&config.logging)?;
//!
//! let mut registry = LocalCollections::new();
//! register_all(&mut registry, &config, &ReaderSet::with_builtin_readers());
//!
//! let collections = registry.list_collections(&["/data/eo"]);
//! let cube = registry.load_collection(&LoadCollectionArgs::new(&collections[0].id))?;
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod family;
pub mod locate;
pub mod olci;
pub mod readers;
pub mod register;
pub mod seviri;
pub mod somo25;

mod loader;

pub use config::{BandProfile, DiscoveryConfig, FamilyConfig, PluginConfig};
pub use error::{PluginError, Result};
pub use family::ProductFamily;
pub use locate::ResolvedProduct;
pub use olci::OlciCollections;
pub use readers::ReaderSet;
pub use register::{register_all, register_olci, register_seviri, register_somo25};
pub use seviri::SeviriCollections;
pub use somo25::Somo25Collections;
