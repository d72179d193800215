//! Installing the family adapters into a [`LocalCollections`] registry.
//!
//! Each family adds exactly one discovery handler and one load handler.
//! Registering a family twice leaves the registry unchanged.

use std::sync::Arc;

use local_collections::{CollectionDiscovery, CollectionLoader, LocalCollections};
use tracing::{debug, info};

use crate::config::PluginConfig;
use crate::family::ProductFamily;
use crate::olci::{OlciCollections, OLCI_HANDLER};
use crate::readers::ReaderSet;
use crate::seviri::{SeviriCollections, SEVIRI_HANDLER};
use crate::somo25::{Somo25Collections, SOMO25_HANDLER};

/// Add both bindings of `adapter` unless a handler of that name exists.
fn install<A>(registry: &mut LocalCollections, name: &str, adapter: A) -> bool
where
    A: CollectionDiscovery + CollectionLoader + 'static,
{
    let adapter = Arc::new(adapter);
    let mut added = false;

    if !registry.has_discovery_handler(name) {
        registry.add_discovery_handler(adapter.clone());
        added = true;
    }
    if !registry.has_load_handler(name) {
        registry.add_load_handler(adapter);
        added = true;
    }

    if added {
        info!(handler = name, "Registered collection plugin");
    } else {
        debug!(handler = name, "Collection plugin already registered");
    }
    added
}

/// Register the Sentinel-3 OLCI `.SEN3` handlers.
///
/// Returns whether anything was added.
pub fn register_olci(
    registry: &mut LocalCollections,
    config: &PluginConfig,
    readers: &ReaderSet,
) -> bool {
    let adapter = OlciCollections::new(config, readers.clone());
    if !adapter.is_enabled() {
        debug!(handler = OLCI_HANDLER, "OLCI disabled in configuration");
        return false;
    }
    install(registry, OLCI_HANDLER, adapter)
}

/// Register the MSG SEVIRI `.nat` handlers.
pub fn register_seviri(
    registry: &mut LocalCollections,
    config: &PluginConfig,
    readers: &ReaderSet,
) -> bool {
    if !config.is_enabled(ProductFamily::SeviriL1b) {
        debug!(handler = SEVIRI_HANDLER, "SEVIRI disabled in configuration");
        return false;
    }
    install(
        registry,
        SEVIRI_HANDLER,
        SeviriCollections::new(config, readers.clone()),
    )
}

/// Register the Metop ASCAT SOMO25 `.nat` handlers.
pub fn register_somo25(
    registry: &mut LocalCollections,
    config: &PluginConfig,
    readers: &ReaderSet,
) -> bool {
    if !config.is_enabled(ProductFamily::Somo25L2) {
        debug!(handler = SOMO25_HANDLER, "SOMO25 disabled in configuration");
        return false;
    }
    install(
        registry,
        SOMO25_HANDLER,
        Somo25Collections::new(config, readers.clone()),
    )
}

/// Register every family, in the order OLCI, SEVIRI, SOMO25.
pub fn register_all(registry: &mut LocalCollections, config: &PluginConfig, readers: &ReaderSet) {
    register_olci(registry, config, readers);
    register_seviri(registry, config, readers);
    register_somo25(registry, config, readers);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_order() {
        let mut registry = LocalCollections::new();
        register_all(&mut registry, &PluginConfig::default(), &ReaderSet::new());

        let expected = [OLCI_HANDLER, SEVIRI_HANDLER, SOMO25_HANDLER];
        assert_eq!(registry.discovery_handler_names(), expected);
        assert_eq!(registry.load_handler_names(), expected);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = LocalCollections::new();
        let config = PluginConfig::default();
        let readers = ReaderSet::new();

        assert!(register_seviri(&mut registry, &config, &readers));
        assert!(!register_seviri(&mut registry, &config, &readers));
        register_all(&mut registry, &config, &readers);

        assert_eq!(registry.discovery_handler_names().len(), 3);
        assert_eq!(registry.load_handler_names().len(), 3);
    }

    #[test]
    fn test_disabled_family_not_registered() {
        let mut config = PluginConfig::default();
        config.families.olci_l1b.enabled = false;
        config.families.olci_l2.enabled = false;

        let mut registry = LocalCollections::new();
        register_all(&mut registry, &config, &ReaderSet::new());
        assert!(!registry.has_discovery_handler(OLCI_HANDLER));
        assert_eq!(registry.load_handler_names(), [SEVIRI_HANDLER, SOMO25_HANDLER]);
    }
}
