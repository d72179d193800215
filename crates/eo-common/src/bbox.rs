//! Geographic bounding box in WGS84 degrees.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 coordinates.
///
/// Serializes as the STAC ordering `[min_lon, min_lat, max_lon, max_lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Whole-Earth bounding box, used whenever a product's footprint is unknown.
    pub const fn global() -> Self {
        Self {
            min_lon: -180.0,
            min_lat: -90.0,
            max_lon: 180.0,
            max_lat: 90.0,
        }
    }

    /// Compute the envelope of paired longitude/latitude samples.
    ///
    /// Non-finite samples (fill values decoded as NaN) are skipped. Returns
    /// `None` when no finite pair remains.
    pub fn from_lon_lat<L, T>(lons: L, lats: T) -> Option<Self>
    where
        L: IntoIterator<Item = f64>,
        T: IntoIterator<Item = f64>,
    {
        let mut envelope: Option<Self> = None;

        for (lon, lat) in lons.into_iter().zip(lats) {
            if !lon.is_finite() || !lat.is_finite() {
                continue;
            }
            envelope = Some(match envelope {
                None => Self::new(lon, lat, lon, lat),
                Some(b) => Self::new(
                    b.min_lon.min(lon),
                    b.min_lat.min(lat),
                    b.max_lon.max(lon),
                    b.max_lat.max(lat),
                ),
            });
        }

        envelope
    }

    /// Width in degrees.
    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// Height in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if a point is contained within this bbox.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn is_global(&self) -> bool {
        *self == Self::global()
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Longitude span as used by a cube's `x` dimension extent.
    pub fn lon_extent(&self) -> [f64; 2] {
        [self.min_lon, self.max_lon]
    }

    /// Latitude span as used by a cube's `y` dimension extent.
    pub fn lat_extent(&self) -> [f64; 2] {
        [self.min_lat, self.max_lat]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::global()
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}
