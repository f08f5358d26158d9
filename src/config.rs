//! Facade configuration
//!
//! Which tenant stores exist and how each is seeded. Loaded from JSON:
//!
//! ```json
//! {
//!   "tenants": [
//!     { "name": "projectOne", "project_id": "project-one", "seed": "one.json" },
//!     { "name": "projectTwo", "enforce_index_rules": false }
//!   ]
//! }
//! ```
//!
//! Relative seed paths resolve against the config file's directory.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::memory::Collections;
use crate::model::Document;
use crate::observability::{log_event_with_fields, Event};
use crate::tenant::{PROJECT_ONE, PROJECT_TWO};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid seed file {}: {reason}", .path.display())]
    Seed { path: PathBuf, reason: String },
}

impl ConfigError {
    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "DUO_CONFIG_IO",
            Self::Parse { .. } => "DUO_CONFIG_PARSE",
            Self::Invalid(_) => "DUO_CONFIG_INVALID",
            Self::Seed { .. } => "DUO_CONFIG_SEED",
        }
    }
}

/// One tenant store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Name the facade is registered under
    pub name: String,

    /// Backing project identifier (default: the tenant name)
    #[serde(default)]
    pub project_id: Option<String>,

    /// JSON file of initial documents
    #[serde(default)]
    pub seed: Option<PathBuf>,

    /// Reject queries that would need a composite index (default: true)
    #[serde(default = "default_enforce_index_rules")]
    pub enforce_index_rules: bool,
}

fn default_enforce_index_rules() -> bool {
    true
}

fn default_tenants() -> Vec<TenantConfig> {
    vec![TenantConfig::named(PROJECT_ONE), TenantConfig::named(PROJECT_TWO)]
}

impl TenantConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_id: None,
            seed: None,
            enforce_index_rules: default_enforce_index_rules(),
        }
    }

    pub fn with_seed(mut self, seed: impl Into<PathBuf>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    pub fn project_id(&self) -> &str {
        self.project_id.as_deref().unwrap_or(&self.name)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacadeConfig {
    /// Tenant stores (default: projectOne and projectTwo)
    #[serde(default = "default_tenants")]
    pub tenants: Vec<TenantConfig>,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            tenants: default_tenants(),
        }
    }
}

impl FacadeConfig {
    /// Loads and validates a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: FacadeConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(base) = path.parent() {
            for tenant in &mut config.tenants {
                if let Some(seed) = tenant.seed.as_mut() {
                    if seed.is_relative() {
                        *seed = base.join(&*seed);
                    }
                }
            }
        }

        config.validate()?;

        let shown = path.display().to_string();
        let tenants = config.tenants.len().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", shown.as_str()), ("tenants", tenants.as_str())],
        );
        Ok(config)
    }

    /// Checks the tenant list is non-empty with unique names
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tenants.is_empty() {
            return Err(ConfigError::Invalid("at least one tenant is required".into()));
        }

        let mut seen = HashSet::new();
        for tenant in &self.tenants {
            if tenant.name.trim().is_empty() {
                return Err(ConfigError::Invalid("tenant name must not be empty".into()));
            }
            if !seen.insert(tenant.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate tenant '{}'",
                    tenant.name
                )));
            }
        }
        Ok(())
    }
}

/// Reads a seed file: `{ "<collection>": { "<id>": { ...fields } } }`
pub fn load_seed(path: &Path) -> Result<Collections, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json: JsonValue = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let seed_error = |reason: String| ConfigError::Seed {
        path: path.to_path_buf(),
        reason,
    };

    let JsonValue::Object(collections) = json else {
        return Err(seed_error("top level must be an object of collections".into()));
    };

    let mut loaded = Collections::new();
    for (collection, documents) in collections {
        let JsonValue::Object(documents) = documents else {
            return Err(seed_error(format!(
                "collection '{}' must be an object of documents",
                collection
            )));
        };

        let mut parsed = BTreeMap::new();
        for (id, fields) in documents {
            let document = Document::from_json(fields).ok_or_else(|| {
                seed_error(format!("document '{}/{}' must be an object", collection, id))
            })?;
            parsed.insert(id, document);
        }
        loaded.insert(collection, parsed);
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_default_config() {
        let config = FacadeConfig::default();
        assert_eq!(config.tenants.len(), 2);
        assert_eq!(config.tenants[0].name, "projectOne");
        assert_eq!(config.tenants[1].name, "projectTwo");
        assert!(config.tenants[0].enforce_index_rules);
    }

    #[test]
    fn test_project_id_defaults_to_name() {
        let tenant = TenantConfig::named("projectOne");
        assert_eq!(tenant.project_id(), "projectOne");
    }

    #[test]
    fn test_parse_with_defaults() {
        let config: FacadeConfig =
            serde_json::from_str(r#"{"tenants":[{"name":"a","project_id":"p-a"}]}"#).unwrap();
        assert_eq!(config.tenants[0].project_id(), "p-a");
        assert!(config.tenants[0].enforce_index_rules);
        assert!(config.tenants[0].seed.is_none());

        let empty: FacadeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, FacadeConfig::default());
    }

    #[test]
    fn test_duplicate_tenant_rejected() {
        let config = FacadeConfig {
            tenants: vec![TenantConfig::named("a"), TenantConfig::named("a")],
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_tenants_rejected() {
        let config = FacadeConfig { tenants: vec![] };
        assert_eq!(config.validate().unwrap_err().code(), "DUO_CONFIG_INVALID");
    }

    #[test]
    fn test_relative_seed_resolved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("duostore.json");
        fs::write(&path, r#"{"tenants":[{"name":"a","seed":"a.json"}]}"#).unwrap();

        let config = FacadeConfig::load(&path).unwrap();
        assert_eq!(config.tenants[0].seed, Some(dir.path().join("a.json")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FacadeConfig::load(Path::new("/nonexistent/duostore.json")).unwrap_err();
        assert_eq!(err.code(), "DUO_CONFIG_IO");
    }

    #[test]
    fn test_load_seed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"waiting-time": {{"a": {{"value": 5, "at": {{"$timestamp": "2024-05-01T00:00:00Z"}}}}}}}}"#
        )
        .unwrap();

        let seed = load_seed(file.path()).unwrap();
        let doc = &seed["waiting-time"]["a"];
        assert_eq!(doc.get("value").and_then(|v| v.as_i64()), Some(5));
        assert!(doc.get("at").and_then(|v| v.as_timestamp()).is_some());
    }

    #[test]
    fn test_seed_document_must_be_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"c": {{"a": 1}}}}"#).unwrap();
        assert!(matches!(
            load_seed(file.path()),
            Err(ConfigError::Seed { .. })
        ));
    }
}
