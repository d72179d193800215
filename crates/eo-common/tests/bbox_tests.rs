//! Tests for BoundingBox serialization and envelopes.

use eo_common::BoundingBox;

// ============================================================================
// Serialization tests
// ============================================================================

#[test]
fn test_bbox_serializes_as_stac_array() {
    let bbox = BoundingBox::new(-10.5, 35.0, 30.25, 60.0);
    let json = serde_json::to_value(bbox).unwrap();
    assert_eq!(json, serde_json::json!([-10.5, 35.0, 30.25, 60.0]));
}

#[test]
fn test_bbox_deserializes_from_array() {
    let bbox: BoundingBox = serde_json::from_str("[-180, -90, 180, 90]").unwrap();
    assert!(bbox.is_global());
}

// ============================================================================
// Envelope tests
// ============================================================================

#[test]
fn test_envelope_of_swath_samples() {
    let lons = [12.0, 14.5, 13.0, 11.25];
    let lats = [-3.0, -2.0, -4.5, -1.0];
    let bbox = BoundingBox::from_lon_lat(lons, lats).unwrap();

    assert_eq!(bbox.min_lon, 11.25);
    assert_eq!(bbox.max_lon, 14.5);
    assert_eq!(bbox.min_lat, -4.5);
    assert_eq!(bbox.max_lat, -1.0);
    assert!((bbox.width() - 3.25).abs() < 1e-12);
    assert!(bbox.contains_point(13.0, -2.5));
    assert!(!bbox.contains_point(20.0, -2.5));
}

#[test]
fn test_envelope_extents() {
    let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
    assert_eq!(bbox.lon_extent(), [1.0, 3.0]);
    assert_eq!(bbox.lat_extent(), [2.0, 4.0]);
}

#[test]
fn test_empty_envelope() {
    let empty: [f64; 0] = [];
    assert!(BoundingBox::from_lon_lat(empty, empty).is_none());
}
