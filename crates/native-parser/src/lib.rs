//! Product-level parsing for EUMETSAT and Copernicus native formats.
//!
//! This crate does not decode pixels of native products on its own. It
//! provides:
//!
//! - [`ProductReader`] / [`Scene`]: the seam behind which family decoders
//!   live, returning deferred arrays
//! - [`NativeHeader`]: the ASCII header scan of `.nat` files (sensing times)
//! - [`SafeManifest`]: `xfdumanifest.xml` parsing for `.SEN3` products
//! - [`olci`]: the file layout of OLCI SAFE products
//!
//! With the `netcdf` feature enabled, [`native::OlciNetcdfReader`] reads OLCI
//! bands directly through libnetcdf.

pub mod error;
pub mod header;
pub mod olci;
pub mod reader;
pub mod safe;

#[cfg(feature = "netcdf")]
pub mod native;

pub use error::{NativeError, NativeResult};
pub use header::{NativeHeader, DEFAULT_SCAN_BYTES};
pub use olci::OlciLevel;
pub use reader::{ProductReader, Scene};
pub use safe::{SafeManifest, MANIFEST_NAME};

#[cfg(feature = "netcdf")]
pub use native::{silence_hdf5_errors, OlciNetcdfReader};
