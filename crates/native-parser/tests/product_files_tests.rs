//! Tests for reading product headers and manifests from disk.

use std::fs;

use chrono::{TimeZone, Utc};
use native_parser::{olci, NativeHeader, OlciLevel, SafeManifest, DEFAULT_SCAN_BYTES};

// ============================================================================
// Native header tests
// ============================================================================

#[test]
fn test_header_read_stops_at_scan_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ASCA_SMO_02_M01_20230101084500Z_20230101102659Z_N_O_20230101101931Z.nat");

    let mut bytes = b"SENSING_START                 = 20230101084500Z\n".to_vec();
    bytes.extend(std::iter::repeat(0u8).take(64));
    bytes.extend_from_slice(b"\nSENSING_END                   = 20230101102659Z\n");
    fs::write(&path, &bytes).unwrap();

    let full = NativeHeader::read(&path, DEFAULT_SCAN_BYTES).unwrap();
    assert_eq!(
        full.sensing_interval().end,
        Some(Utc.with_ymd_and_hms(2023, 1, 1, 10, 26, 59).unwrap())
    );

    let truncated = NativeHeader::read(&path, 60).unwrap();
    assert!(truncated.sensing_interval().start.is_some());
    assert!(truncated.sensing_interval().end.is_none());
}

#[test]
fn test_header_read_missing_file() {
    assert!(NativeHeader::read("/nonexistent/file.nat", DEFAULT_SCAN_BYTES).is_err());
}

// ============================================================================
// SAFE manifest tests
// ============================================================================

#[test]
fn test_manifest_read_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("xfdumanifest.xml"),
        r#"<xfdu:XFDU xmlns:xfdu="x" xmlns:sentinel-safe="s" xmlns:gml="g">
  <sentinel-safe:startTime>2024-06-01T09:00:00.000000Z</sentinel-safe:startTime>
  <sentinel-safe:stopTime>2024-06-01T09:03:00.000000Z</sentinel-safe:stopTime>
  <gml:posList>50.0 -5.0 52.0 2.0 48.0 1.0</gml:posList>
</xfdu:XFDU>"#,
    )
    .unwrap();

    let manifest = SafeManifest::read_dir(dir.path()).unwrap();
    let interval = manifest.interval();
    assert_eq!(
        interval.midpoint(),
        Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 1, 30).unwrap())
    );
    assert_eq!(
        manifest.footprint_bbox().unwrap().to_array(),
        [-5.0, 48.0, 2.0, 52.0]
    );
}

#[test]
fn test_manifest_missing() {
    let dir = tempfile::tempdir().unwrap();
    assert!(SafeManifest::read_dir(dir.path()).is_err());
}

// ============================================================================
// OLCI layout tests
// ============================================================================

#[test]
fn test_no_supported_files_in_empty_product() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("xfdumanifest.xml"), "<a/>").unwrap();
    fs::create_dir(dir.path().join("Oa01_radiance.nc.d")).unwrap();

    assert!(olci::supported_files(dir.path()).unwrap().is_empty());
}

#[test]
fn test_level2_mask_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("wqsf.nc"), b"").unwrap();
    let files = olci::supported_files(dir.path()).unwrap();

    let (_, variable) = olci::find_band_file(&files, OlciLevel::L2, "mask").unwrap();
    assert_eq!(variable, "WQSF");
}
