//! Sentinel-3 OLCI SAFE (`.SEN3`) collections, Level-1B and Level-2.

use std::path::Path;

use datacube::DataCube;
use eo_common::{BoundingBox, SensingInterval};
use local_collections::{
    CollectionDescriptor, CollectionDiscovery, CollectionLoader, LoadCollectionArgs,
};
use native_parser::SafeManifest;
use tracing::{info, warn};

use crate::config::{BandProfile, PluginConfig};
use crate::descriptor::{build_descriptor, ProductMetadata};
use crate::error::{PluginError, Result};
use crate::family::ProductFamily;
use crate::loader::{open_scene, stack_gridded};
use crate::locate::{is_sen3_name, resolve_sen3, ResolvedProduct};
use crate::readers::ReaderSet;

/// Handler name of both OLCI bindings.
pub const OLCI_HANDLER: &str = "olci_sen3";

/// Discovery and loading of `.SEN3` products.
#[derive(Debug, Clone)]
pub struct OlciCollections {
    l1b: Option<BandProfile>,
    l2: Option<BandProfile>,
    readers: ReaderSet,
}

impl OlciCollections {
    /// Levels disabled in `config` are not recognised.
    pub fn new(config: &PluginConfig, readers: ReaderSet) -> Self {
        let profile = |family| {
            config
                .is_enabled(family)
                .then(|| config.profile(family))
        };
        Self {
            l1b: profile(ProductFamily::OlciL1b),
            l2: profile(ProductFamily::OlciL2),
            readers,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.l1b.is_some() || self.l2.is_some()
    }

    fn profile(&self, family: ProductFamily) -> Option<&BandProfile> {
        match family {
            ProductFamily::OlciL1b => self.l1b.as_ref(),
            ProductFamily::OlciL2 => self.l2.as_ref(),
            _ => None,
        }
    }

    /// Recognise a `.SEN3` directory of an enabled level.
    pub fn resolve(&self, path: &Path) -> Result<Option<ResolvedProduct>> {
        Ok(resolve_sen3(path)?.filter(|p| self.profile(p.family).is_some()))
    }

    /// Describe a product.
    ///
    /// The interval comes from the manifest, then the product name; the bbox
    /// from the manifest footprint, else global. A missing or unreadable
    /// manifest only drops what it would have provided.
    pub fn describe(&self, product: &ResolvedProduct) -> Option<CollectionDescriptor> {
        let profile = self.profile(product.family)?;

        let manifest = match SafeManifest::read_dir(&product.path) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(
                    path = %product.path.display(),
                    error = %e,
                    "Failed to read OLCI manifest, using name and defaults"
                );
                None
            }
        };

        let embedded = manifest
            .as_ref()
            .map(SafeManifest::interval)
            .unwrap_or_else(SensingInterval::unknown);
        let metadata = ProductMetadata {
            interval: embedded.or(product.family.filename_interval(&product.name())),
            bbox: manifest
                .as_ref()
                .and_then(SafeManifest::footprint_bbox)
                .unwrap_or_else(BoundingBox::global),
            bands: profile.declared.clone(),
        };

        Some(build_descriptor(product, metadata))
    }

    /// Load a product as a `(time, bands, y, x)` cube.
    pub fn load_product(
        &self,
        product: &ResolvedProduct,
        requested: Option<&[String]>,
    ) -> Result<DataCube> {
        let family = product.family;
        let profile = self
            .profile(family)
            .ok_or_else(|| PluginError::InvalidConfig(format!("{family} is disabled")))?;
        let bands = profile.select(family, requested)?;

        if product.files.is_empty() {
            return Err(PluginError::NoSupportedFiles(product.path.clone()));
        }

        let reader = self.readers.for_family(family)?;
        let scene = open_scene(reader.as_ref(), &product.files, &bands)?;
        let cube = stack_gridded(product, reader.as_ref(), &scene, &bands)?;

        info!(id = %product.id(), family = %family, bands = bands.len(), "Loaded OLCI product");
        Ok(cube)
    }
}

impl CollectionDiscovery for OlciCollections {
    fn name(&self) -> &str {
        OLCI_HANDLER
    }

    fn discover(&self, path: &Path) -> anyhow::Result<Option<CollectionDescriptor>> {
        Ok(self
            .resolve(path)?
            .and_then(|product| self.describe(&product)))
    }
}

impl CollectionLoader for OlciCollections {
    fn name(&self) -> &str {
        OLCI_HANDLER
    }

    fn load(&self, path: &Path, args: &LoadCollectionArgs) -> anyhow::Result<Option<DataCube>> {
        if !is_sen3_name(path) {
            return Ok(None);
        }
        if !path.exists() {
            return Err(PluginError::NotFound(path.to_path_buf()).into());
        }
        if !path.is_dir() {
            return Err(PluginError::NotADirectory(path.to_path_buf()).into());
        }

        match self.resolve(path)? {
            Some(product) => Ok(Some(self.load_product(&product, args.requested_bands())?)),
            None => Ok(None),
        }
    }
}
