//! Local collection extension points.
//!
//! A local EO-processing host lists collections by walking configured roots
//! and loads them by id. This crate provides the two extension points the
//! host exposes for that, as an explicit registry:
//!
//! - [`CollectionDiscovery`] handlers turn recognised paths into
//!   [`CollectionDescriptor`]s
//! - [`CollectionLoader`] handlers turn a [`LoadCollectionArgs`] bag into a
//!   [`datacube::DataCube`]
//!
//! Both are tried in registration order and the first answer wins.

pub mod args;
pub mod error;
pub mod logging;
pub mod registry;
pub mod stac;

pub use args::LoadCollectionArgs;
pub use error::{CollectionError, CollectionResult};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use registry::{CollectionDiscovery, CollectionLoader, LocalCollections};
pub use stac::{
    Asset, CollectionDescriptor, CubeDimension, CubeDimensions, DimensionExtent, EoBand, Extent,
    Link, Provider, SpatialExtent, Summaries, TemporalExtent, STAC_VERSION, WGS84,
};
