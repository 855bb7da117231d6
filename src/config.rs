//! Engine configuration loaded from YAML
//!
//! ```yaml
//! expansion:
//!   relations: [supports]
//!   max_depth: 2
//! render:
//!   format: markdown
//! export:
//!   format: jsonld
//! audit:
//!   sink: tracing
//! ```
//!
//! Every section is optional; missing keys take their defaults.

use crate::audit::{AuditSink, NullAuditSink, TracingAuditSink};
use crate::gateway::{EnforcementGateway, Expansion, ExportFormat, RenderFormat};
use crate::storage::RecordStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub format: RenderFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
}

/// Where audit events go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    #[default]
    Tracing,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub sink: AuditSinkKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MesaConfig {
    pub expansion: Expansion,
    pub render: RenderConfig,
    pub export: ExportConfig,
    pub audit: AuditConfig,
}

impl MesaConfig {
    /// Parse a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from an explicit path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` if given, else from the default location if a file
    /// exists there, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::load(path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn audit_sink(&self) -> Arc<dyn AuditSink> {
        match self.audit.sink {
            AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
            AuditSinkKind::None => Arc::new(NullAuditSink),
        }
    }

    /// Build a gateway over `store` using this configuration
    pub fn gateway(&self, store: Arc<dyn RecordStore>) -> EnforcementGateway {
        EnforcementGateway::new(store, self.audit_sink()).with_expansion(self.expansion.clone())
    }
}

/// `<config_dir>/mesa/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mesa").join("config.yaml"))
}
