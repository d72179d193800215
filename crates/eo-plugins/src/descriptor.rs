//! Collection descriptors for resolved products.

use std::path::Path;

use eo_common::{BoundingBox, SensingInterval};
use local_collections::{Asset, CollectionDescriptor, Provider};
use native_parser::NativeHeader;
use tracing::warn;

use crate::family::ProductFamily;
use crate::locate::{file_name, posix_id, ResolvedProduct};

/// Metadata derived from a product, before it is written into a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMetadata {
    pub interval: SensingInterval,
    pub bbox: BoundingBox,
    pub bands: Vec<String>,
}

impl ProductMetadata {
    /// Global bbox, unknown interval and the given band list.
    pub fn safe_default(bands: Vec<String>) -> Self {
        Self {
            interval: SensingInterval::unknown(),
            bbox: BoundingBox::global(),
            bands,
        }
    }
}

/// Sensing interval of a `.nat` file: the header times, then the file name.
///
/// An unreadable header is logged and leaves the file name as the only source.
pub(crate) fn native_interval(
    family: ProductFamily,
    file: &Path,
    header_scan_bytes: usize,
) -> SensingInterval {
    let embedded = match NativeHeader::read(file, header_scan_bytes) {
        Ok(header) => header.sensing_interval(),
        Err(e) => {
            warn!(
                path = %file.display(),
                family = %family,
                error = %e,
                "Failed to read native header, using file name times"
            );
            SensingInterval::unknown()
        }
    };
    embedded.or(family.filename_interval(file_name(file).unwrap_or_default()))
}

fn eumetsat() -> Provider {
    Provider::new("EUMETSAT")
        .with_roles(["producer", "licensor"])
        .with_url("https://www.eumetsat.int/")
}

fn title(family: ProductFamily, name: &str) -> String {
    match family {
        ProductFamily::OlciL1b | ProductFamily::OlciL2 => name.to_string(),
        ProductFamily::SeviriL1b => format!("MSG SEVIRI L1b Native ({name})"),
        ProductFamily::Somo25L2 => format!("Metop ASCAT Soil Moisture 25 km (SOMO25) ({name})"),
    }
}

fn description(family: ProductFamily) -> &'static str {
    match family {
        ProductFamily::OlciL1b => "Sentinel-3 OLCI Level-1B EFR product (.SEN3)",
        ProductFamily::OlciL2 => "Sentinel-3 OLCI Level-2 WFR product (.SEN3)",
        ProductFamily::SeviriL1b => {
            "Meteosat SEVIRI Level-1b data in native (.nat) format exposed as a local collection."
        }
        ProductFamily::Somo25L2 => {
            "Metop ASCAT Soil Moisture 25 km (SOMO25) Level-2 product in EPS native (.nat) \
             format exposed as a local collection."
        }
    }
}

fn keywords(family: ProductFamily) -> &'static [&'static str] {
    match family {
        ProductFamily::OlciL1b => &["Copernicus", "Sentinel-3", "OLCI", "L1B", "SAFE"],
        ProductFamily::OlciL2 => &["Copernicus", "Sentinel-3", "OLCI", "L2", "SAFE"],
        ProductFamily::SeviriL1b => &["EUMETSAT", "Meteosat", "MSG", "SEVIRI", "L1b", "Native"],
        ProductFamily::Somo25L2 => &[
            "EUMETSAT",
            "Metop",
            "ASCAT",
            "Soil Moisture",
            "SOMO25",
            "L2",
            "Native",
        ],
    }
}

/// The data asset: the `.SEN3` directory, or the single `.nat` file.
fn product_asset(product: &ResolvedProduct) -> Asset {
    match product.native_file() {
        Some(file) => Asset::data(posix_id(file)).with_type("application/octet-stream"),
        None => Asset::data(product.id()).with_type("application/x-safe"),
    }
}

/// Build the descriptor of a resolved product.
pub fn build_descriptor(
    product: &ResolvedProduct,
    metadata: ProductMetadata,
) -> CollectionDescriptor {
    let family = product.family;
    CollectionDescriptor::new(product.id(), title(family, &product.name()))
        .with_description(description(family))
        .with_license("proprietary")
        .with_provider(eumetsat())
        .with_keywords(keywords(family).iter().copied())
        .with_bbox(metadata.bbox)
        .with_interval(&metadata.interval)
        .with_bands(metadata.bands)
        .with_asset("product", product_asset(product))
}
