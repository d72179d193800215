//! Discovery and load extension points of the local host.
//!
//! Handlers are kept in registration order. The first discovery handler that
//! recognises a path describes it; the first load handler that returns a cube
//! answers a `load_collection` call.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use datacube::DataCube;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::args::LoadCollectionArgs;
use crate::error::{CollectionError, CollectionResult};
use crate::stac::CollectionDescriptor;

/// Describes filesystem paths it recognises.
pub trait CollectionDiscovery: Send + Sync {
    /// Unique handler name.
    fn name(&self) -> &str;

    /// `Ok(None)` when the path is not one of this handler's products.
    fn discover(&self, path: &Path) -> anyhow::Result<Option<CollectionDescriptor>>;
}

/// Loads collections it recognises into a cube.
pub trait CollectionLoader: Send + Sync {
    /// Unique handler name.
    fn name(&self) -> &str;

    /// `Ok(None)` when `path` is not one of this handler's products.
    fn load(&self, path: &Path, args: &LoadCollectionArgs) -> anyhow::Result<Option<DataCube>>;
}

/// Ordered, append-only handler registry.
#[derive(Default, Clone)]
pub struct LocalCollections {
    discovery: Vec<Arc<dyn CollectionDiscovery>>,
    loaders: Vec<Arc<dyn CollectionLoader>>,
}

impl LocalCollections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_discovery_handler(&mut self, handler: Arc<dyn CollectionDiscovery>) {
        debug!(handler = handler.name(), "Registered discovery handler");
        self.discovery.push(handler);
    }

    pub fn add_load_handler(&mut self, handler: Arc<dyn CollectionLoader>) {
        debug!(handler = handler.name(), "Registered load handler");
        self.loaders.push(handler);
    }

    pub fn has_discovery_handler(&self, name: &str) -> bool {
        self.discovery.iter().any(|h| h.name() == name)
    }

    pub fn has_load_handler(&self, name: &str) -> bool {
        self.loaders.iter().any(|h| h.name() == name)
    }

    /// Discovery handler names in registration order.
    pub fn discovery_handler_names(&self) -> Vec<&str> {
        self.discovery.iter().map(|h| h.name()).collect()
    }

    /// Load handler names in registration order.
    pub fn load_handler_names(&self) -> Vec<&str> {
        self.loaders.iter().map(|h| h.name()).collect()
    }

    /// Ask each discovery handler about one path; the first match wins.
    ///
    /// Handler failures are logged and the next handler is tried.
    pub fn discover(&self, path: &Path) -> Option<CollectionDescriptor> {
        for handler in &self.discovery {
            match handler.discover(path) {
                Ok(Some(descriptor)) => {
                    debug!(
                        handler = handler.name(),
                        id = %descriptor.id,
                        "Discovered collection"
                    );
                    return Some(descriptor);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(
                        handler = handler.name(),
                        path = %path.display(),
                        error = %e,
                        "Discovery handler failed"
                    );
                }
            }
        }
        None
    }

    /// Walk `roots` (each root included) and describe every recognised product.
    ///
    /// A recognised directory that is the product itself is not descended
    /// into. A directory listed for the data files it holds is descended into,
    /// and only those files are skipped. A root is never listed that way: it
    /// is a place to search, so its files are described on their own.
    /// Unreadable entries are logged and skipped.
    pub fn list_collections<P: AsRef<Path>>(&self, roots: &[P]) -> Vec<CollectionDescriptor> {
        let mut collections = Vec::new();

        for root in roots {
            let root = root.as_ref();
            let mut covered: HashSet<PathBuf> = HashSet::new();
            let mut walker = WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter();

            while let Some(entry) = walker.next() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                        continue;
                    }
                };
                if covered.contains(entry.path()) {
                    continue;
                }

                let Some(descriptor) = self.discover(entry.path()) else {
                    continue;
                };
                let is_dir = entry.file_type().is_dir();

                if is_dir && descriptor.wraps_assets(entry.path()) {
                    if entry.depth() == 0 {
                        debug!(
                            root = %root.display(),
                            id = %descriptor.id,
                            "Root is not a collection"
                        );
                        continue;
                    }
                    covered.extend(descriptor.asset_paths());
                    collections.push(descriptor);
                    continue;
                }

                collections.push(descriptor);
                if is_dir {
                    walker.skip_current_dir();
                }
            }
        }

        info!(
            roots = roots.len(),
            collections = collections.len(),
            "Listed local collections"
        );
        collections
    }

    /// Dispatch a `load_collection` call; the first handler returning a cube wins.
    pub fn load_collection(&self, args: &LoadCollectionArgs) -> CollectionResult<DataCube> {
        let path = Path::new(&args.id);

        for handler in &self.loaders {
            match handler.load(path, args) {
                Ok(Some(cube)) => {
                    info!(
                        handler = handler.name(),
                        id = %args.id,
                        shape = ?cube.shape(),
                        "Loaded collection"
                    );
                    return Ok(cube);
                }
                Ok(None) => {}
                Err(source) => {
                    return Err(CollectionError::Handler {
                        handler: handler.name().to_string(),
                        id: args.id.clone(),
                        source,
                    });
                }
            }
        }

        Err(CollectionError::NoHandler(args.id.clone()))
    }

    /// [`load_collection`](Self::load_collection) from a raw JSON argument bag.
    pub fn load_collection_json(&self, args: serde_json::Value) -> CollectionResult<DataCube> {
        let args = LoadCollectionArgs::from_json(args)?;
        self.load_collection(&args)
    }
}

impl std::fmt::Debug for LocalCollections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCollections")
            .field("discovery", &self.discovery_handler_names())
            .field("loaders", &self.load_handler_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl CollectionDiscovery for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn discover(&self, path: &Path) -> anyhow::Result<Option<CollectionDescriptor>> {
            Ok(Some(CollectionDescriptor::new(
                path.to_string_lossy(),
                self.0,
            )))
        }
    }

    struct Failing;

    impl CollectionDiscovery for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn discover(&self, _path: &Path) -> anyhow::Result<Option<CollectionDescriptor>> {
            anyhow::bail!("corrupt header")
        }
    }

    #[test]
    fn test_first_match_wins() {
        let mut registry = LocalCollections::new();
        registry.add_discovery_handler(Arc::new(Named("a")));
        registry.add_discovery_handler(Arc::new(Named("b")));

        let desc = registry.discover(Path::new("/x")).unwrap();
        assert_eq!(desc.title, "a");
        assert_eq!(registry.discovery_handler_names(), ["a", "b"]);
    }

    #[test]
    fn test_failing_handler_falls_through() {
        let mut registry = LocalCollections::new();
        registry.add_discovery_handler(Arc::new(Failing));
        registry.add_discovery_handler(Arc::new(Named("b")));

        assert_eq!(registry.discover(Path::new("/x")).unwrap().title, "b");
        assert!(registry.has_discovery_handler("failing"));
        assert!(!registry.has_load_handler("failing"));
    }

    #[test]
    fn test_no_load_handler() {
        let registry = LocalCollections::new();
        let err = registry
            .load_collection(&LoadCollectionArgs::new("/nowhere"))
            .unwrap_err();
        assert!(matches!(err, CollectionError::NoHandler(id) if id == "/nowhere"));
    }
}
