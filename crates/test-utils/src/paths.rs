//! Path utilities for locating optional real product files.
//!
//! Synthetic products cover most tests. Real EUMETSAT or Copernicus products
//! are large and are never committed, so tests that use them look them up
//! here and skip when absent.

use std::path::PathBuf;

/// Environment variable pointing at a directory of real products.
pub const TEST_DATA_ENV: &str = "TEST_DATA_DIR";

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a product file or `.SEN3` directory.
///
/// Checks `$TEST_DATA_DIR` first, then the workspace-level `testdata/`.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(dir) = std::env::var(TEST_DATA_ENV) {
        candidates.push(PathBuf::from(dir).join(name));
    }
    candidates.push(workspace_root().join("testdata").join(name));

    candidates.into_iter().find(|path| path.exists())
}
