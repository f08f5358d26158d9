//! Tenant wiring
//!
//! Each tenant store gets its own [`DocumentFacade`], registered under a
//! name. Handles are passed in explicitly; there is no global registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::client::StoreClient;
use crate::config::{load_seed, ConfigError, FacadeConfig};
use crate::facade::DocumentFacade;
use crate::memory::{MemoryStore, MemoryStoreConfig};
use crate::observability::{log_event_with_fields, Event};

/// Default name of the first tenant
pub const PROJECT_ONE: &str = "projectOne";

/// Default name of the second tenant
pub const PROJECT_TWO: &str = "projectTwo";

/// Facades keyed by tenant name
#[derive(Clone, Default)]
pub struct Tenants {
    facades: BTreeMap<String, DocumentFacade>,
}

impl Tenants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds in-memory stores for every configured tenant, loading seeds
    pub fn from_config(config: &FacadeConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut tenants = Self::new();
        for tenant in &config.tenants {
            let store = MemoryStore::with_config(
                tenant.project_id(),
                MemoryStoreConfig {
                    enforce_index_rules: tenant.enforce_index_rules,
                },
            );
            if let Some(seed) = &tenant.seed {
                store.load(load_seed(seed)?);
            }
            tenants.register(tenant.name.clone(), Arc::new(store));
        }
        Ok(tenants)
    }

    /// Adds or replaces a tenant
    pub fn register(&mut self, name: impl Into<String>, client: Arc<dyn StoreClient>) {
        let name = name.into();
        log_event_with_fields(
            Event::TenantRegistered,
            &[("tenant", name.as_str()), ("project", client.project_id())],
        );
        self.facades.insert(name, DocumentFacade::new(client));
    }

    pub fn with_tenant(mut self, name: impl Into<String>, client: Arc<dyn StoreClient>) -> Self {
        self.register(name, client);
        self
    }

    pub fn get(&self, name: &str) -> Option<&DocumentFacade> {
        self.facades.get(name)
    }

    pub fn project_one(&self) -> Option<&DocumentFacade> {
        self.get(PROJECT_ONE)
    }

    pub fn project_two(&self) -> Option<&DocumentFacade> {
        self.get(PROJECT_TWO)
    }

    /// Tenant names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.facades.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.facades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facades.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TenantConfig;

    #[test]
    fn test_default_config_wires_both_projects() {
        let tenants = Tenants::from_config(&FacadeConfig::default()).unwrap();
        assert_eq!(tenants.len(), 2);
        assert_eq!(tenants.project_one().unwrap().project_id(), "projectOne");
        assert_eq!(tenants.project_two().unwrap().project_id(), "projectTwo");
        assert!(tenants.get("projectThree").is_none());
    }

    #[test]
    fn test_register_explicit_client() {
        let tenants = Tenants::new().with_tenant("a", Arc::new(MemoryStore::new("project-a")));
        assert_eq!(tenants.names().collect::<Vec<_>>(), ["a"]);
        assert_eq!(tenants.get("a").unwrap().project_id(), "project-a");
    }

    #[test]
    fn test_missing_seed_fails() {
        let config = FacadeConfig {
            tenants: vec![TenantConfig::named("a").with_seed("/nonexistent/seed.json")],
        };
        assert!(matches!(
            Tenants::from_config(&config),
            Err(ConfigError::Io { .. })
        ));
    }
}
