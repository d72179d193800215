//! Meteosat SEVIRI Level-1.5 native (`.nat`) collections.
//!
//! SEVIRI products carry two incompatible grids: the high-resolution visible
//! channel (HRV) and the eleven channels on the 3 km grid. A single cube holds
//! one of the two groups.

use std::path::Path;

use datacube::DataCube;
use eo_common::BoundingBox;
use local_collections::{
    CollectionDescriptor, CollectionDiscovery, CollectionLoader, LoadCollectionArgs,
};
use tracing::{info, warn};

use crate::config::{mixes_seviri_grids, BandProfile, PluginConfig, SEVIRI_HRV_BANDS};
use crate::descriptor::{build_descriptor, native_interval, ProductMetadata};
use crate::error::{PluginError, Result};
use crate::family::ProductFamily;
use crate::loader::{open_scene, stack_gridded};
use crate::locate::{is_native_name, resolve_native, ResolvedProduct};
use crate::readers::ReaderSet;

/// Handler name of both SEVIRI bindings.
pub const SEVIRI_HANDLER: &str = "seviri_nat";

const FAMILY: ProductFamily = ProductFamily::SeviriL1b;

/// Discovery and loading of SEVIRI `.nat` products.
#[derive(Debug, Clone)]
pub struct SeviriCollections {
    profile: BandProfile,
    header_scan_bytes: usize,
    readers: ReaderSet,
}

impl SeviriCollections {
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
    /// The interval comes from the header, then the file name. A product
    /// without its native file gets the safe default.
    pub fn describe(&self, product: &ResolvedProduct) -> CollectionDescriptor {
        let metadata = self.extract(product).unwrap_or_else(|e| {
            warn!(
                path = %product.path.display(),
                error = %e,
                "Failed to derive SEVIRI metadata, using defaults"
            );
            ProductMetadata::safe_default(self.profile.declared.clone())
        });
        build_descriptor(product, metadata)
    }

    fn extract(&self, product: &ResolvedProduct) -> Result<ProductMetadata> {
        let file = product
            .native_file()
            .ok_or_else(|| PluginError::NotANativeFile(product.path.clone()))?;

        // Full-disk product: the footprint is not refined.
        Ok(ProductMetadata {
            interval: native_interval(FAMILY, file, self.header_scan_bytes),
            bbox: BoundingBox::global(),
            bands: self.profile.declared.clone(),
        })
    }

    /// Bands to load for a request, rejecting unknown names and HRV mixed
    /// with 3 km channels.
    pub fn select_bands(&self, requested: Option<&[String]>) -> Result<Vec<String>> {
        let bands = self.profile.select(FAMILY, requested)?;

        if mixes_seviri_grids(&bands) {
            return Err(PluginError::IncompatibleBandGroups {
                family: FAMILY.label(),
                first: SEVIRI_HRV_BANDS.iter().map(|b| b.to_string()).collect(),
                second: self
                    .profile
                    .known
                    .iter()
                    .filter(|b| !SEVIRI_HRV_BANDS.contains(&b.as_str()))
                    .cloned()
                    .collect(),
            });
        }

        Ok(bands)
    }

    /// Load a product as a `(time, bands, y, x)` cube.
    pub fn load_product(
        &self,
        product: &ResolvedProduct,
        requested: Option<&[String]>,
    ) -> Result<DataCube> {
        let bands = self.select_bands(requested)?;

        let reader = self.readers.for_family(FAMILY)?;
        let scene = open_scene(reader.as_ref(), &product.files, &bands)?;
        let cube = stack_gridded(product, reader.as_ref(), &scene, &bands)?;

        info!(id = %product.id(), bands = bands.len(), "Loaded SEVIRI product");
        Ok(cube)
    }
}

impl CollectionDiscovery for SeviriCollections {
    fn name(&self) -> &str {
        SEVIRI_HANDLER
    }

    fn discover(&self, path: &Path) -> anyhow::Result<Option<CollectionDescriptor>> {
        Ok(self.resolve(path)?.map(|product| self.describe(&product)))
    }
}

impl CollectionLoader for SeviriCollections {
    fn name(&self) -> &str {
        SEVIRI_HANDLER
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
