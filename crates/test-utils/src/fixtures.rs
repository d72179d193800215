//! Synthetic product fixtures.
//!
//! These write products that look like the real thing to path recognition
//! and metadata extraction: correctly named `.nat` files with an ASCII
//! header followed by binary filler, and `.SEN3` directories with a SAFE
//! manifest and empty band files. Pixel data comes from a fake reader.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Realistic product names.
pub mod names {
    /// MSG SEVIRI Level-1.5, nominal time 2023-01-01T12:12:41.885Z.
    pub const SEVIRI: &str = "MSG3-SEVI-MSG15-0100-NA-20230101121241.885000000Z-NA.nat";

    /// Metop ASCAT SOMO25, 2023-01-01T08:45:00Z to 10:26:59Z.
    pub const SOMO25: &str =
        "ASCA_SMO_02_M01_20230101084500Z_20230101102659Z_N_O_20230101101931Z.nat";

    /// Sentinel-3A OLCI Level-1B full resolution.
    pub const OLCI_L1B: &str =
        "S3A_OL_1_EFR____20230105T101010_20230105T101310_20230105T120000_0179_094_122_2160_PS1_O_NR_002.SEN3";

    /// Sentinel-3B OLCI Level-2 water full resolution.
    pub const OLCI_L2: &str =
        "S3B_OL_2_WFR____20230105T094512_20230105T094812_20230105T120000_0179_074_036_2160_MAR_O_NR_003.SEN3";
}

/// Common sensing times, as written in product headers and manifests.
pub mod times {
    pub const SEVIRI_START: &str = "20230101120010.885";
    pub const SEVIRI_END: &str = "20230101121241.885";

    pub const SOMO25_START: &str = "20230101084500Z";
    pub const SOMO25_END: &str = "20230101102659Z";

    pub const OLCI_START: &str = "2023-01-05T10:10:10.000000Z";
    pub const OLCI_STOP: &str = "2023-01-05T10:13:10.000000Z";
}

/// Common footprints as `(lat, lon)` ring vertices.
pub mod footprints {
    /// North Sea / Channel ring. Envelope `[-5, 48, 2, 52]`.
    pub const CHANNEL: [(f64, f64); 4] = [(50.0, -5.0), (52.0, 2.0), (48.0, 1.0), (50.0, -5.0)];
}

/// Bytes of an EPS-style (`KEY = value`) main product header.
pub fn eps_header(product_name: &str, start: &str, end: &str) -> Vec<u8> {
    format!(
        "PRODUCT_NAME                  = {product_name}\n\
         INSTRUMENT_ID                 = ASCA\n\
         PROCESSING_LEVEL              = 02\n\
         SENSING_START                 = {start}\n\
         SENSING_END                   = {end}\n"
    )
    .into_bytes()
}

/// Bytes of an MSG native (`KEY : value`) main product header.
pub fn msg_header(start: &str, end: &str) -> Vec<u8> {
    format!(
        "FormatName                  : NATIVE\n\
         FormatDocumentName          : MSG Level 1.5 Native Format\n\
         SENSING_START               : {start}\n\
         SENSING_END                 : {end}\n"
    )
    .into_bytes()
}

/// Write `header` followed by `filler` bytes of binary noise to `dir/name`.
pub fn write_native_file(
    dir: &Path,
    name: &str,
    header: &[u8],
    filler: usize,
) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let mut bytes = header.to_vec();
    bytes.extend((0..filler).map(|i| (i % 251) as u8));
    fs::write(&path, bytes)?;
    Ok(path)
}

/// A SEVIRI product with a valid header.
pub fn write_seviri_product(dir: &Path) -> io::Result<PathBuf> {
    write_native_file(
        dir,
        names::SEVIRI,
        &msg_header(times::SEVIRI_START, times::SEVIRI_END),
        512,
    )
}

/// A SOMO25 product with a valid header.
pub fn write_somo25_product(dir: &Path) -> io::Result<PathBuf> {
    write_native_file(
        dir,
        names::SOMO25,
        &eps_header(names::SOMO25, times::SOMO25_START, times::SOMO25_END),
        512,
    )
}

/// `xfdumanifest.xml` content with sensing times and a footprint ring.
pub fn manifest_xml(start: &str, stop: &str, footprint: &[(f64, f64)]) -> String {
    let pos_list = footprint
        .iter()
        .map(|(lat, lon)| format!("{lat} {lon}"))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:sentinel-safe="http://www.esa.int/safe/sentinel/1.1" xmlns:gml="http://www.opengis.net/gml">
  <metadataSection>
    <metadataObject ID="acquisitionPeriod">
      <metadataWrap>
        <xmlData>
          <sentinel-safe:acquisitionPeriod>
            <sentinel-safe:startTime>{start}</sentinel-safe:startTime>
            <sentinel-safe:stopTime>{stop}</sentinel-safe:stopTime>
          </sentinel-safe:acquisitionPeriod>
        </xmlData>
      </metadataWrap>
    </metadataObject>
    <metadataObject ID="measurementFrameSet">
      <metadataWrap>
        <xmlData>
          <sentinel-safe:frameSet>
            <sentinel-safe:footPrint>
              <gml:posList>{pos_list}</gml:posList>
            </sentinel-safe:footPrint>
          </sentinel-safe:frameSet>
        </xmlData>
      </metadataWrap>
    </metadataObject>
  </metadataSection>
</xfdu:XFDU>
"#
    )
}

/// Create `dir/name` as a `.SEN3` directory holding empty `files` and,
/// when given, a manifest.
pub fn write_sen3_product(
    dir: &Path,
    name: &str,
    manifest: Option<&str>,
    files: &[&str],
) -> io::Result<PathBuf> {
    let product = dir.join(name);
    fs::create_dir_all(&product)?;

    if let Some(xml) = manifest {
        fs::write(product.join("xfdumanifest.xml"), xml)?;
    }
    for file in files {
        fs::write(product.join(file), b"")?;
    }
    Ok(product)
}

/// An OLCI L1B product with manifest, the first three radiance files and the
/// tie-point angles.
pub fn write_olci_l1b_product(dir: &Path) -> io::Result<PathBuf> {
    let manifest = manifest_xml(times::OLCI_START, times::OLCI_STOP, &footprints::CHANNEL);
    write_sen3_product(
        dir,
        names::OLCI_L1B,
        Some(&manifest),
        &[
            "Oa01_radiance.nc",
            "Oa02_radiance.nc",
            "Oa03_radiance.nc",
            "geo_coordinates.nc",
            "qualityFlags.nc",
            "tie_geometries.nc",
        ],
    )
}
