//! SAFE manifest (`xfdumanifest.xml`) parsing for Sentinel-3 products.
//!
//! The manifest carries everything discovery needs without touching the
//! NetCDF payload: acquisition start/stop, the product type and the
//! footprint polygon (`gml:posList`, latitude/longitude pairs).

use std::path::Path;

use chrono::{DateTime, Utc};
use eo_common::{parse_timestamp, BoundingBox, SensingInterval};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::error::{NativeError, NativeResult};

/// Manifest file name inside a SAFE directory.
pub const MANIFEST_NAME: &str = "xfdumanifest.xml";

/// Fields of interest from a SAFE manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SafeManifest {
    pub start_time: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,
    /// e.g. `OL_1_EFR___`, `OL_2_WFR___`
    pub product_type: Option<String>,
    /// Footprint vertices as (lat, lon).
    pub footprint: Vec<(f64, f64)>,
    /// Relative paths of data objects listed in the manifest.
    pub data_objects: Vec<String>,
}

impl SafeManifest {
    /// Read `xfdumanifest.xml` from a SAFE directory.
    pub fn read_dir<P: AsRef<Path>>(dir: P) -> NativeResult<Self> {
        let path = dir.as_ref().join(MANIFEST_NAME);
        let xml = std::fs::read_to_string(&path)?;
        let manifest = Self::parse(&xml)?;
        debug!(
            path = %path.display(),
            product_type = ?manifest.product_type,
            vertices = manifest.footprint.len(),
            "Parsed SAFE manifest"
        );
        Ok(manifest)
    }

    /// Parse manifest XML.
    pub fn parse(xml: &str) -> NativeResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut manifest = SafeManifest::default();
        let mut current: Vec<u8> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    current = e.local_name().as_ref().to_vec();
                }
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"fileLocation" {
                        for attr in e.attributes() {
                            let attr = attr.map_err(|err| NativeError::Xml(err.to_string()))?;
                            if attr.key.local_name().as_ref() == b"href" {
                                let href = attr.unescape_value()?;
                                manifest
                                    .data_objects
                                    .push(href.trim_start_matches("./").to_string());
                            }
                        }
                    }
                }
                Event::Text(t) => {
                    let text = t.unescape()?;
                    match current.as_slice() {
                        b"startTime" => manifest.start_time = Some(parse_time(&text)?),
                        b"stopTime" => manifest.stop_time = Some(parse_time(&text)?),
                        b"productType" => manifest.product_type = Some(text.trim().to_string()),
                        b"posList" => manifest.footprint = parse_pos_list(&text)?,
                        _ => {}
                    }
                }
                Event::End(_) => current.clear(),
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(manifest)
    }

    pub fn interval(&self) -> SensingInterval {
        SensingInterval::new(self.start_time, self.stop_time)
    }

    /// Envelope of the footprint polygon, if one was present.
    pub fn footprint_bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_lon_lat(
            self.footprint.iter().map(|&(_, lon)| lon),
            self.footprint.iter().map(|&(lat, _)| lat),
        )
    }
}

fn parse_time(text: &str) -> NativeResult<DateTime<Utc>> {
    parse_timestamp(text).map_err(|e| NativeError::InvalidFormat(e.to_string()))
}

/// Parse a whitespace-separated `lat lon lat lon ...` list.
fn parse_pos_list(text: &str) -> NativeResult<Vec<(f64, f64)>> {
    let values = text
        .split_whitespace()
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| NativeError::InvalidFormat(format!("posList value '{v}'")))
        })
        .collect::<NativeResult<Vec<f64>>>()?;

    if values.len() % 2 != 0 {
        return Err(NativeError::InvalidFormat(format!(
            "posList has an odd number of values ({})",
            values.len()
        )));
    }

    Ok(values.chunks_exact(2).map(|p| (p[0], p[1])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:sentinel-safe="http://www.esa.int/safe/sentinel/1.1" xmlns:sentinel3="http://www.esa.int/safe/sentinel/sentinel-3/1.0" xmlns:gml="http://www.opengis.net/gml">
  <metadataSection>
    <metadataObject ID="acquisitionPeriod">
      <metadataWrap><xmlData>
        <sentinel-safe:acquisitionPeriod>
          <sentinel-safe:startTime>2023-01-05T10:10:10.123456Z</sentinel-safe:startTime>
          <sentinel-safe:stopTime>2023-01-05T10:13:10.123456Z</sentinel-safe:stopTime>
        </sentinel-safe:acquisitionPeriod>
      </xmlData></metadataWrap>
    </metadataObject>
    <metadataObject ID="generalProductInformation">
      <metadataWrap><xmlData>
        <sentinel3:generalProductInformation>
          <sentinel3:productType>OL_1_EFR___</sentinel3:productType>
        </sentinel3:generalProductInformation>
      </xmlData></metadataWrap>
    </metadataObject>
    <metadataObject ID="measurementFrameSet">
      <metadataWrap><xmlData>
        <sentinel-safe:frameSet><sentinel-safe:footPrint>
          <gml:posList>45.0 10.0 46.5 12.5 44.0 13.0 45.0 10.0</gml:posList>
        </sentinel-safe:footPrint></sentinel-safe:frameSet>
      </xmlData></metadataWrap>
    </metadataObject>
  </metadataSection>
  <dataObjectSection>
    <dataObject ID="Oa01_radianceData">
      <byteStream><fileLocation locatorType="URL" href="./Oa01_radiance.nc"/></byteStream>
    </dataObject>
  </dataObjectSection>
</xfdu:XFDU>"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = SafeManifest::parse(MANIFEST).unwrap();
        assert_eq!(manifest.product_type.as_deref(), Some("OL_1_EFR___"));
        assert_eq!(manifest.data_objects, vec!["Oa01_radiance.nc".to_string()]);
        assert_eq!(manifest.footprint.len(), 4);

        let start = manifest.start_time.unwrap();
        assert_eq!(
            start.date_naive(),
            Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap().date_naive()
        );
    }

    #[test]
    fn test_footprint_bbox() {
        let manifest = SafeManifest::parse(MANIFEST).unwrap();
        let bbox = manifest.footprint_bbox().unwrap();
        assert_eq!(bbox.to_array(), [10.0, 44.0, 13.0, 46.5]);
    }

    #[test]
    fn test_odd_pos_list_rejected() {
        let xml = "<a><gml:posList xmlns:gml=\"g\">1.0 2.0 3.0</gml:posList></a>";
        assert!(matches!(
            SafeManifest::parse(xml),
            Err(NativeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_malformed_xml_rejected() {
        assert!(SafeManifest::parse("<a><b></a>").is_err());
    }
}
