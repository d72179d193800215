//! Discovery and loading of SEVIRI `.nat` products against a fake reader.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use eo_plugins::config::{SEVIRI_3KM_BANDS, SEVIRI_HRV_BANDS};
use eo_plugins::{PluginConfig, PluginError, ReaderSet, SeviriCollections};
use local_collections::{CollectionDiscovery, CollectionLoader, LoadCollectionArgs};
use test_utils::{fixtures, FakeReader, BAND_OFFSET};

const READER: &str = "seviri_l1b_native";

fn fake_reader() -> FakeReader {
    FakeReader::gridded(READER, 4, 5).with_times(
        Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 10).unwrap(),
        Utc.with_ymd_and_hms(2023, 1, 1, 12, 12, 40).unwrap(),
    )
}

fn adapter(reader: &FakeReader) -> SeviriCollections {
    let readers = ReaderSet::new().with_reader(Arc::new(reader.clone()));
    SeviriCollections::new(&PluginConfig::default(), readers)
}

fn load(
    adapter: &SeviriCollections,
    path: &Path,
    bands: &[&str],
) -> anyhow::Result<Option<datacube::DataCube>> {
    let args = LoadCollectionArgs::new(path.to_string_lossy()).with_bands(bands.iter().copied());
    adapter.load(path, &args)
}

fn plugin_error(err: &anyhow::Error) -> &PluginError {
    err.downcast_ref::<PluginError>()
        .unwrap_or_else(|| panic!("expected a plugin error, got: {err:#}"))
}

// ============================================================================
// Discovery tests
// ============================================================================

#[test]
fn test_discover_native_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let adapter = adapter(&fake_reader());

    let descriptor = adapter.discover(&path).unwrap().unwrap();

    assert_eq!(descriptor.id, path.to_string_lossy());
    assert_eq!(
        descriptor.title,
        format!("MSG SEVIRI L1b Native ({})", fixtures::names::SEVIRI)
    );
    assert_eq!(descriptor.type_, "Collection");
    assert_eq!(descriptor.license, "proprietary");
    assert_eq!(descriptor.providers[0].name, "EUMETSAT");

    let bands = descriptor.band_names();
    assert_eq!(bands.len(), 12);
    assert_eq!(bands[0], SEVIRI_HRV_BANDS[0]);
    assert_eq!(&bands[1..], &SEVIRI_3KM_BANDS[..]);

    assert!(descriptor.bbox().unwrap().is_global());
    assert_eq!(
        descriptor.interval().unwrap(),
        &[
            Some("2023-01-01T12:00:10Z".to_string()),
            Some("2023-01-01T12:12:41Z".to_string())
        ]
    );
}

#[test]
fn test_discover_falls_back_to_filename_time() {
    let dir = tempfile::tempdir().unwrap();
    let path =
        fixtures::write_native_file(dir.path(), fixtures::names::SEVIRI, b"\x00\x01binary", 64)
            .unwrap();

    let descriptor = adapter(&fake_reader()).discover(&path).unwrap().unwrap();
    let nominal = Some("2023-01-01T12:12:41Z".to_string());
    assert_eq!(descriptor.interval().unwrap(), &[nominal.clone(), nominal]);
}

#[test]
fn test_discover_does_not_open_the_product() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let reader = fake_reader();

    adapter(&reader).discover(&path).unwrap().unwrap();
    assert_eq!(reader.open_count(), 0);
}

#[test]
fn test_discover_directory_with_one_product() {
    let dir = tempfile::tempdir().unwrap();
    fixtures::write_seviri_product(dir.path()).unwrap();
    fs::write(dir.path().join("README.txt"), "notes").unwrap();

    let descriptor = adapter(&fake_reader()).discover(dir.path()).unwrap().unwrap();
    assert_eq!(descriptor.id, dir.path().to_string_lossy());
}

#[test]
fn test_discover_directory_with_zero_or_many_products() {
    let empty = tempfile::tempdir().unwrap();
    let adapter = adapter(&fake_reader());
    assert!(adapter.discover(empty.path()).unwrap().is_none());

    let many = tempfile::tempdir().unwrap();
    fixtures::write_seviri_product(many.path()).unwrap();
    fixtures::write_native_file(
        many.path(),
        "MSG3-SEVI-MSG15-0100-NA-20230101124241.885000000Z-NA.nat",
        b"",
        16,
    )
    .unwrap();
    assert!(adapter.discover(many.path()).unwrap().is_none());
}

#[test]
fn test_discover_ignores_other_products() {
    let dir = tempfile::tempdir().unwrap();
    let somo = fixtures::write_somo25_product(dir.path()).unwrap();
    let text = dir.path().join("notes.txt");
    fs::write(&text, "SEVI").unwrap();

    let adapter = adapter(&fake_reader());
    assert!(adapter.discover(&somo).unwrap().is_none());
    assert!(adapter.discover(&text).unwrap().is_none());
}

// ============================================================================
// Load tests
// ============================================================================

#[test]
fn test_default_load_is_the_3km_group() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let reader = fake_reader();

    let cube = load(&adapter(&reader), &path, &[]).unwrap().unwrap();

    assert_eq!(cube.dims(), ["time", "bands", "y", "x"]);
    assert_eq!(cube.shape(), [1, 11, 4, 5]);
    assert_eq!(cube.band_names(), &SEVIRI_3KM_BANDS[..]);
    assert_eq!(
        cube.time(),
        Some(Utc.with_ymd_and_hms(2023, 1, 1, 12, 6, 25).unwrap())
    );
    let id = path.to_string_lossy().into_owned();
    assert_eq!(cube.attr("collection_id"), Some(id.as_str()));
    assert_eq!(cube.attr("reader"), Some(READER));

    // Pixel data stays deferred until compute.
    assert_eq!(reader.open_count(), 1);
    assert_eq!(reader.compute_count(), 0);
    let values = cube.compute().unwrap();
    assert_eq!(values.shape(), &[1, 11, 4, 5]);
    assert_eq!(reader.compute_count(), 11);
}

#[test]
fn test_band_order_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let reader = fake_reader();

    let requested = ["WV_073", "IR_016", "VIS006"];
    let cube = load(&adapter(&reader), &path, &requested).unwrap().unwrap();

    assert_eq!(cube.band_names(), &requested[..]);
    let ir = cube.compute_band("IR_016").unwrap().unwrap();
    assert_eq!(ir[[0, 0]], 2.0 * BAND_OFFSET);
    assert_eq!(reader.requests(), vec![requested.map(String::from).to_vec()]);
}

#[test]
fn test_hrv_alone_loads_on_its_own_grid() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let reader = fake_reader().with_shape("HRV", &[12, 15]);

    let cube = load(&adapter(&reader), &path, &["HRV"]).unwrap().unwrap();
    assert_eq!(cube.shape(), [1, 1, 12, 15]);
}

#[test]
fn test_hrv_mixed_with_3km_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let reader = fake_reader();

    let err = load(&adapter(&reader), &path, &["HRV", "VIS006"]).unwrap_err();

    match plugin_error(&err) {
        PluginError::IncompatibleBandGroups { first, second, .. } => {
            assert_eq!(first, &["HRV"]);
            assert_eq!(second.len(), 11);
            assert!(second.contains(&"VIS006".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    let message = err.to_string();
    assert!(message.contains("HRV"));
    assert!(message.contains("IR_016"));
    assert_eq!(reader.open_count(), 0);
}

#[test]
fn test_unknown_band_rejected_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let reader = fake_reader();

    let err = load(&adapter(&reader), &path, &["VIS006", "B99", "B99"]).unwrap_err();

    match plugin_error(&err) {
        PluginError::UnknownBands { unknown, allowed, .. } => {
            assert_eq!(unknown, &["B99"]);
            assert_eq!(allowed.len(), 12);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(reader.open_count(), 0);
}

#[test]
fn test_load_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(fixtures::names::SEVIRI);

    let err = load(&adapter(&fake_reader()), &path, &[]).unwrap_err();
    assert!(matches!(plugin_error(&err), PluginError::NotFound(_)));
}

#[test]
fn test_load_ignores_other_paths() {
    let dir = tempfile::tempdir().unwrap();
    let somo = fixtures::write_somo25_product(dir.path()).unwrap();

    assert!(load(&adapter(&fake_reader()), &somo, &[]).unwrap().is_none());
}

#[test]
fn test_load_without_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let adapter = SeviriCollections::new(&PluginConfig::default(), ReaderSet::new());

    // Discovery needs no reader.
    assert!(adapter.discover(&path).unwrap().is_some());

    let err = load(&adapter, &path, &[]).unwrap_err();
    assert!(matches!(
        plugin_error(&err),
        PluginError::ReaderUnavailable(name) if name == READER
    ));
}

#[test]
fn test_reader_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::write_seviri_product(dir.path()).unwrap();
    let reader = fake_reader().failing("truncated 15 header");

    let err = load(&adapter(&reader), &path, &[]).unwrap_err();
    assert!(matches!(plugin_error(&err), PluginError::Reader { .. }));
    assert!(format!("{err:#}").contains("truncated 15 header"));
}

// ============================================================================
// Real product tests (skipped unless TEST_DATA_DIR holds the file)
// ============================================================================

#[test]
fn test_real_product_header() {
    let path = test_utils::require_test_file!(
        "MSG4-SEVI-MSG15-0100-NA-20240101121243.176000000Z-NA.nat"
    );

    let descriptor = adapter(&fake_reader()).discover(&path).unwrap().unwrap();
    let [start, end] = descriptor.interval().unwrap().clone();
    assert!(start.unwrap().starts_with("2024-01-01T12:"));
    assert!(end.is_some());
}
