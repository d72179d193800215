//! STAC-like collection descriptors.
//!
//! Discovery handlers describe every recognised product with a
//! [`CollectionDescriptor`]. Its `id` is the posix path of the product and is
//! the value a caller later passes to `load_collection`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use eo_common::{BoundingBox, SensingInterval};
use serde::{Deserialize, Serialize};

/// STAC version written into every descriptor.
pub const STAC_VERSION: &str = "1.0.0";

/// Reference system of the spatial cube dimensions.
pub const WGS84: &str = "EPSG:4326";

/// A collection as listed by the local host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionDescriptor {
    pub stac_version: String,

    #[serde(rename = "type")]
    pub type_: String,

    /// Normalised posix path of the product.
    pub id: String,

    pub title: String,

    pub description: String,

    pub license: String,

    #[serde(default)]
    pub providers: Vec<Provider>,

    #[serde(default)]
    pub links: Vec<Link>,

    #[serde(default)]
    pub keywords: Vec<String>,

    pub extent: Extent,

    #[serde(rename = "cube:dimensions")]
    pub cube_dimensions: CubeDimensions,

    pub summaries: Summaries,

    /// Data behind the collection, keyed by asset name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<String, Asset>,
}

impl CollectionDescriptor {
    /// Create a descriptor with a global extent, unknown interval and no bands.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let bbox = BoundingBox::global();
        let interval = SensingInterval::unknown();
        Self {
            stac_version: STAC_VERSION.to_string(),
            type_: "Collection".to_string(),
            id: id.into(),
            title: title.into(),
            description: String::new(),
            license: "proprietary".to_string(),
            providers: Vec::new(),
            links: Vec::new(),
            keywords: Vec::new(),
            extent: Extent::new(bbox, &interval),
            cube_dimensions: CubeDimensions::new(bbox, &interval, Vec::new()),
            summaries: Summaries::default(),
            assets: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Set the spatial extent and the `x`/`y` dimension extents.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.extent.spatial = SpatialExtent { bbox: vec![bbox] };
        self.cube_dimensions.x = CubeDimension::spatial("x", bbox.lon_extent());
        self.cube_dimensions.y = CubeDimension::spatial("y", bbox.lat_extent());
        self
    }

    /// Set the temporal extent and the `t` dimension extent.
    pub fn with_interval(mut self, interval: &SensingInterval) -> Self {
        self.extent.temporal = TemporalExtent {
            interval: vec![interval.to_iso_pair()],
        };
        self.cube_dimensions.t = CubeDimension::temporal(interval);
        self
    }

    /// Set the band list of both `cube:dimensions` and `eo:bands`.
    pub fn with_bands<I, S>(mut self, bands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bands: Vec<String> = bands.into_iter().map(Into::into).collect();
        self.summaries.eo_bands = bands.iter().map(|b| EoBand::new(b.as_str())).collect();
        self.cube_dimensions.bands = CubeDimension::bands(bands);
        self
    }

    pub fn with_asset(mut self, key: impl Into<String>, asset: Asset) -> Self {
        self.assets.insert(key.into(), asset);
        self
    }

    /// Asset hrefs as paths.
    pub fn asset_paths(&self) -> Vec<PathBuf> {
        self.assets.values().map(|a| PathBuf::from(&a.href)).collect()
    }

    /// Whether `path` is a folder listed only for the data files it holds:
    /// the descriptor has assets and none of them is `path` itself.
    pub fn wraps_assets(&self, path: &Path) -> bool {
        !self.assets.is_empty() && self.assets.values().all(|a| Path::new(&a.href) != path)
    }

    /// First spatial bbox of the extent.
    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.extent.spatial.bbox.first()
    }

    /// First `[start, end]` pair of the temporal extent.
    pub fn interval(&self) -> Option<&[Option<String>; 2]> {
        self.extent.temporal.interval.first()
    }

    pub fn band_names(&self) -> &[String] {
        self.cube_dimensions.bands.values.as_deref().unwrap_or(&[])
    }
}

/// An organisation involved with the data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub name: String,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Provider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roles: Vec::new(),
            url: None,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A hyperlink to a related resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Link {
    pub href: String,

    pub rel: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: rel.into(),
            type_: None,
            title: None,
        }
    }

    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A file or directory holding collection data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub href: String,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl Asset {
    /// A `data` asset.
    pub fn data(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            type_: None,
            roles: vec!["data".to_string()],
        }
    }

    pub fn with_type(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }
}

/// Spatial and temporal extent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

impl Extent {
    pub fn new(bbox: BoundingBox, interval: &SensingInterval) -> Self {
        Self {
            spatial: SpatialExtent { bbox: vec![bbox] },
            temporal: TemporalExtent {
                interval: vec![interval.to_iso_pair()],
            },
        }
    }
}

/// Always a one-element list of `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpatialExtent {
    pub bbox: Vec<BoundingBox>,
}

/// Always a one-element list of `[start | null, end | null]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<String>; 2]>,
}

/// The `cube:dimensions` block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CubeDimensions {
    pub x: CubeDimension,
    pub y: CubeDimension,
    pub t: CubeDimension,
    pub bands: CubeDimension,
}

impl CubeDimensions {
    pub fn new(bbox: BoundingBox, interval: &SensingInterval, bands: Vec<String>) -> Self {
        Self {
            x: CubeDimension::spatial("x", bbox.lon_extent()),
            y: CubeDimension::spatial("y", bbox.lat_extent()),
            t: CubeDimension::temporal(interval),
            bands: CubeDimension::bands(bands),
        }
    }
}

/// One entry of `cube:dimensions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CubeDimension {
    /// `spatial`, `temporal` or `bands`
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<DimensionExtent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_system: Option<String>,
}

impl CubeDimension {
    pub fn spatial(axis: &str, extent: [f64; 2]) -> Self {
        Self {
            type_: "spatial".to_string(),
            axis: Some(axis.to_string()),
            extent: Some(DimensionExtent::Spatial(extent)),
            values: None,
            reference_system: Some(WGS84.to_string()),
        }
    }

    pub fn temporal(interval: &SensingInterval) -> Self {
        Self {
            type_: "temporal".to_string(),
            axis: None,
            extent: Some(DimensionExtent::Temporal(interval.to_iso_pair())),
            values: None,
            reference_system: None,
        }
    }

    pub fn bands(values: Vec<String>) -> Self {
        Self {
            type_: "bands".to_string(),
            axis: None,
            extent: None,
            values: Some(values),
            reference_system: None,
        }
    }
}

/// Numeric extent of a spatial dimension or ISO bounds of a temporal one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DimensionExtent {
    Spatial([f64; 2]),
    Temporal([Option<String>; 2]),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Summaries {
    #[serde(rename = "eo:bands", default)]
    pub eo_bands: Vec<EoBand>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EoBand {
    pub name: String,
}

impl EoBand {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
