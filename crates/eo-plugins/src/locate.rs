//! Recognising product paths.
//!
//! A locator answers "is this path one of my products?" using the path name
//! and, for directories, one listing. Anything it does not recognise is
//! `Ok(None)`; a path never resolves to more than one product.

use std::fs;
use std::path::{Component, Path, PathBuf};

use native_parser::olci;
use tracing::trace;

use crate::error::Result;
use crate::family::{is_seviri_name, is_somo25_name, ProductFamily, SEN3_SUFFIX};

/// A recognised product: its collection path and the files it consists of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub family: ProductFamily,
    /// Path the collection id is derived from.
    pub path: PathBuf,
    /// Data files; for native products exactly one `.nat` file.
    pub files: Vec<PathBuf>,
}

impl ResolvedProduct {
    /// Collection id: the normalised posix form of [`path`](Self::path).
    pub fn id(&self) -> String {
        posix_id(&self.path)
    }

    /// Last path component, used for titles and filename timestamps.
    pub fn name(&self) -> String {
        file_name(&self.path).unwrap_or_default().to_string()
    }

    /// The single native file of a `.nat` product.
    pub fn native_file(&self) -> Option<&Path> {
        match self.family {
            ProductFamily::SeviriL1b | ProductFamily::Somo25L2 => {
                self.files.first().map(PathBuf::as_path)
            }
            _ => None,
        }
    }
}

/// Normalised posix form of a path: `.` components and trailing separators
/// dropped, `\` written as `/`.
pub fn posix_id(path: &Path) -> String {
    let normalised: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    normalised.to_string_lossy().replace('\\', "/")
}

pub(crate) fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Whether the name alone claims the path for OLCI.
pub fn is_sen3_name(path: &Path) -> bool {
    file_name(path).is_some_and(|n| n.ends_with(SEN3_SUFFIX))
}

/// Whether the name alone claims the path as a `.nat` file of `family`.
pub fn is_native_name(path: &Path, family: ProductFamily) -> bool {
    let has_nat_suffix = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("nat"));

    has_nat_suffix
        && file_name(path).is_some_and(|name| match family {
            ProductFamily::SeviriL1b => is_seviri_name(name),
            ProductFamily::Somo25L2 => is_somo25_name(name),
            _ => false,
        })
}

/// Resolve an OLCI `.SEN3` directory.
///
/// The level comes from the `_OL_1_` / `_OL_2_` marker in the name, or from
/// the presence of `*_reflectance.nc` files when the marker is missing.
pub fn resolve_sen3(path: &Path) -> Result<Option<ResolvedProduct>> {
    if !is_sen3_name(path) || !path.is_dir() {
        return Ok(None);
    }

    let files = olci::supported_files(path)?;
    let name = file_name(path).unwrap_or_default();

    let family = if name.contains("_OL_1_") {
        ProductFamily::OlciL1b
    } else if name.contains("_OL_2_") {
        ProductFamily::OlciL2
    } else if files
        .iter()
        .filter_map(|f| file_name(f))
        .any(|n| n.ends_with("_reflectance.nc"))
    {
        ProductFamily::OlciL2
    } else {
        ProductFamily::OlciL1b
    };

    trace!(path = %path.display(), family = %family, files = files.len(), "Resolved SEN3 product");

    Ok(Some(ResolvedProduct {
        family,
        path: path.to_path_buf(),
        files,
    }))
}

/// Resolve a `.nat` product of `family`: the file itself, or a directory
/// holding exactly one such file.
pub fn resolve_native(path: &Path, family: ProductFamily) -> Result<Option<ResolvedProduct>> {
    if path.is_file() {
        return Ok(is_native_name(path, family).then(|| ResolvedProduct {
            family,
            path: path.to_path_buf(),
            files: vec![path.to_path_buf()],
        }));
    }

    if !path.is_dir() {
        return Ok(None);
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let candidate = entry.path();
        if entry.file_type()?.is_file() && is_native_name(&candidate, family) {
            candidates.push(candidate);
        }
    }

    if candidates.len() != 1 {
        trace!(
            path = %path.display(),
            family = %family,
            candidates = candidates.len(),
            "Directory does not hold exactly one native file"
        );
        return Ok(None);
    }

    Ok(Some(ResolvedProduct {
        family,
        path: path.to_path_buf(),
        files: candidates,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_id() {
        assert_eq!(posix_id(Path::new("/data/./x.SEN3/")), "/data/x.SEN3");
        assert_eq!(posix_id(Path::new("rel/a.nat")), "rel/a.nat");
    }

    #[test]
    fn test_native_name_case_insensitive_suffix() {
        let path = Path::new("/d/MSG3-SEVI-MSG15-0100-NA-20230101121241.885000000Z-NA.NAT");
        assert!(is_native_name(path, ProductFamily::SeviriL1b));
        assert!(!is_native_name(path, ProductFamily::Somo25L2));
        assert!(!is_native_name(Path::new("/d/MSG3-SEVI.nc"), ProductFamily::SeviriL1b));
    }

    #[test]
    fn test_sen3_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fake.SEN3");
        fs::write(&file, b"").unwrap();
        assert!(resolve_sen3(&file).unwrap().is_none());
        assert!(resolve_sen3(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_sen3_level_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let product = dir.path().join("PRODUCT.SEN3");
        fs::create_dir(&product).unwrap();
        fs::write(product.join("Oa01_reflectance.nc"), b"").unwrap();

        let resolved = resolve_sen3(&product).unwrap().unwrap();
        assert_eq!(resolved.family, ProductFamily::OlciL2);
        assert_eq!(resolved.files.len(), 1);
    }

    #[test]
    fn test_native_dir_needs_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_native(dir.path(), ProductFamily::Somo25L2)
            .unwrap()
            .is_none());

        fs::write(dir.path().join("ASCA_SMO_02_M01_a.nat"), b"").unwrap();
        let resolved = resolve_native(dir.path(), ProductFamily::Somo25L2)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.path, dir.path());
        assert!(resolved.native_file().unwrap().ends_with("ASCA_SMO_02_M01_a.nat"));

        fs::write(dir.path().join("ASCA_SMO_02_M01_b.nat"), b"").unwrap();
        assert!(resolve_native(dir.path(), ProductFamily::Somo25L2)
            .unwrap()
            .is_none());
    }
}
