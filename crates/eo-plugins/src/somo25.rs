//! Metop ASCAT SOMO25 Level-2 native (`.nat`) collections.
//!
//! SOMO25 is a swath product: the reader yields one-dimensional observation
//! streams tagged with `line_num` and `node_num`. Loading grids them onto a
//! `(y = line, x = node)` swath grid.

use std::path::Path;
use std::sync::Arc;

use datacube::{CubeError, DataCube, SwathGrid};
use eo_common::BoundingBox;
use local_collections::{
    CollectionDescriptor, CollectionDiscovery, CollectionLoader, LoadCollectionArgs,
};
use tracing::{debug, info, warn};

use crate::config::{BandProfile, PluginConfig};
use crate::descriptor::{build_descriptor, native_interval, ProductMetadata};
use crate::error::{PluginError, Result};
use crate::family::ProductFamily;
use crate::loader::{annotate, open_scene, scene_variable};
use crate::locate::{is_native_name, resolve_native, ResolvedProduct};
use crate::readers::ReaderSet;

/// Handler name of both SOMO25 bindings.
pub const SOMO25_HANDLER: &str = "somo25_nat";

/// Observation index fields used for gridding.
pub const LINE_VAR: &str = "line_num";
pub const NODE_VAR: &str = "node_num";

/// Geolocation fields used for the descriptor footprint.
pub const LON_VAR: &str = "lon";
pub const LAT_VAR: &str = "lat";

const FAMILY: ProductFamily = ProductFamily::Somo25L2;

/// Discovery and loading of SOMO25 `.nat` products.
#[derive(Debug, Clone)]
pub struct Somo25Collections {
    profile: BandProfile,
    header_scan_bytes: usize,
    readers: ReaderSet,
}

impl Somo25Collections {
    pub fn new(config: &PluginConfig, readers: ReaderSet) -> Self {
        Self {
            profile: config.profile(FAMILY),
            header_scan_bytes: config.discovery.header_scan_bytes,
            readers,
        }
    }

    pub fn profile(&self) -> &BandProfile {
        &self.profile
    }

    pub fn resolve(&self, path: &Path) -> Result<Option<ResolvedProduct>> {
        resolve_native(path, FAMILY)
    }

    /// Describe a product.
    ///
    /// The interval comes from the header, then the file name; the bbox from
    /// the swath footprint, else global. Each falls back on its own. A
    /// product without its native file gets the safe default.
    pub fn describe(&self, product: &ResolvedProduct) -> CollectionDescriptor {
        let metadata = self.extract(product).unwrap_or_else(|e| {
            warn!(
                path = %product.path.display(),
                error = %e,
                "Failed to derive SOMO25 metadata, using defaults"
            );
            ProductMetadata::safe_default(self.profile.declared.clone())
        });
        build_descriptor(product, metadata)
    }

    fn extract(&self, product: &ResolvedProduct) -> Result<ProductMetadata> {
        let file = product
            .native_file()
            .ok_or_else(|| PluginError::NotANativeFile(product.path.clone()))?;
        let bbox = self.footprint(product).unwrap_or_else(|e| {
            warn!(
                path = %product.path.display(),
                error = %e,
                "Failed to derive SOMO25 footprint, using global bbox"
            );
            BoundingBox::global()
        });

        Ok(ProductMetadata {
            interval: native_interval(FAMILY, file, self.header_scan_bytes),
            bbox,
            bands: self.profile.declared.clone(),
        })
    }

    /// NaN-aware envelope of the observation longitudes and latitudes.
    fn footprint(&self, product: &ResolvedProduct) -> Result<BoundingBox> {
        let reader = self.readers.for_family(FAMILY)?;
        let variables = [LON_VAR.to_string(), LAT_VAR.to_string()];
        let scene = open_scene(reader.as_ref(), &product.files, &variables)?;

        let lon = scene_variable(&scene, reader.as_ref(), LON_VAR)?.compute()?;
        let lat = scene_variable(&scene, reader.as_ref(), LAT_VAR)?.compute()?;

        let bbox = BoundingBox::from_lon_lat(
            lon.iter().map(|&v| f64::from(v)),
            lat.iter().map(|&v| f64::from(v)),
        );
        Ok(bbox.unwrap_or_else(BoundingBox::global))
    }

    /// Load a product as a `(time, bands, y, x)` cube on the swath grid.
    ///
    /// Index fields are read while loading; band values stay deferred and are
    /// scattered onto the grid on compute.
    pub fn load_product(
        &self,
        product: &ResolvedProduct,
        requested: Option<&[String]>,
    ) -> Result<DataCube> {
        let bands = self.profile.select(FAMILY, requested)?;

        let mut variables = bands.clone();
        variables.extend([LINE_VAR.to_string(), NODE_VAR.to_string()]);

        let reader = self.readers.for_family(FAMILY)?;
        let scene = open_scene(reader.as_ref(), &product.files, &variables)?;

        let lines = index_values(&scene_variable(&scene, reader.as_ref(), LINE_VAR)?)?;
        let nodes = index_values(&scene_variable(&scene, reader.as_ref(), NODE_VAR)?)?;
        let grid = Arc::new(SwathGrid::from_indices(&lines, &nodes)?);

        debug!(
            observations = grid.observations(),
            shape = ?grid.shape(),
            "Built SOMO25 swath grid"
        );

        let mut layers = Vec::with_capacity(bands.len());
        for band in &bands {
            let observations = scene_variable(&scene, reader.as_ref(), band)?;
            if observations.shape() != [grid.observations()] {
                return Err(CubeError::ObservationCount {
                    expected: grid.observations(),
                    actual: observations.len(),
                }
                .into());
            }
            layers.push((band.clone(), grid.scatter_lazy(&observations)));
        }

        let cube = DataCube::stack(scene.interval().midpoint(), layers)?
            .with_coords(grid.y_coords(), grid.x_coords())?;
        let cube = annotate(cube, product, reader.as_ref());

        info!(id = %product.id(), bands = bands.len(), "Loaded SOMO25 product");
        Ok(cube)
    }
}

/// Materialise a one-dimensional index field.
fn index_values(field: &datacube::LazyArray) -> Result<Vec<f64>> {
    let values = field.compute()?;
    if values.ndim() != 1 {
        return Err(CubeError::InvalidSwathIndex(format!(
            "index field has {} dimensions",
            values.ndim()
        ))
        .into());
    }
    Ok(values.iter().map(|&v| f64::from(v)).collect())
}

impl CollectionDiscovery for Somo25Collections {
    fn name(&self) -> &str {
        SOMO25_HANDLER
    }

    fn discover(&self, path: &Path) -> anyhow::Result<Option<CollectionDescriptor>> {
        Ok(self.resolve(path)?.map(|product| self.describe(&product)))
    }
}

impl CollectionLoader for Somo25Collections {
    fn name(&self) -> &str {
        SOMO25_HANDLER
    }

    fn load(&self, path: &Path, args: &LoadCollectionArgs) -> anyhow::Result<Option<DataCube>> {
        if is_native_name(path, FAMILY) && !path.exists() {
            return Err(PluginError::NotFound(path.to_path_buf()).into());
        }

        match self.resolve(path)? {
            Some(product) => Ok(Some(self.load_product(&product, args.requested_bands())?)),
            None => Ok(None),
        }
    }
}
