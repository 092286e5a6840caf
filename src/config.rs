//! Configuration for audit behavior and staleness policy

use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Default npm registry endpoint
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Default manifest file looked up inside the audited directory
pub const DEFAULT_MANIFEST_FILE: &str = "package.json";

/// Main configuration for the audit process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Staleness policy applied to each resolved package
    pub staleness: StalenessPolicy,
    /// Network configuration
    pub network: NetworkConfig,
    /// Manifest file name inside the project directory
    pub manifest_file: String,
    /// Dependencies to ignore in the audit
    pub ignored_dependencies: HashSet<String>,
}

/// Which published version the classifier dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckTarget {
    /// The registry's `latest` dist-tag, used as a proxy for package health
    Latest,
    /// The exact version named by the manifest constraint
    Declared,
}

impl std::str::FromStr for CheckTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" => Ok(CheckTarget::Latest),
            "declared" => Ok(CheckTarget::Declared),
            _ => Err(format!("Unknown check target: {}", s)),
        }
    }
}

/// Thresholds for determining staleness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessPolicy {
    /// Days since the evaluated publish before a package is a graveyard candidate
    pub stale_days: u32,
    /// Version evaluated for each dependency
    pub check_target: CheckTarget,
}

/// Network configuration for registry calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Registry base URL
    pub registry_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of lookups in flight (1 = strictly sequential)
    pub concurrency: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            staleness: StalenessPolicy::default(),
            network: NetworkConfig::default(),
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            ignored_dependencies: HashSet::new(),
        }
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            stale_days: 730, // 2 years
            check_target: CheckTarget::Latest,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            timeout_secs: 30,
            concurrency: 1,
        }
    }
}

impl NetworkConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AuditConfig {
    /// Create a new builder for AuditConfig
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::default()
    }

    /// Load configuration from a TOML file. Missing keys fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuditConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the audit cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.network.concurrency == 0 {
            return Err(AuditError::config("concurrency must be at least 1"));
        }
        if self.network.timeout_secs == 0 {
            return Err(AuditError::config("timeout_secs must be at least 1"));
        }
        if self.network.registry_url.trim().is_empty() {
            return Err(AuditError::config("registry_url must not be empty"));
        }
        if self.manifest_file.trim().is_empty() {
            return Err(AuditError::config("manifest_file must not be empty"));
        }
        Ok(())
    }
}

/// Builder for AuditConfig
#[derive(Default)]
pub struct AuditConfigBuilder {
    staleness: Option<StalenessPolicy>,
    network: Option<NetworkConfig>,
    manifest_file: Option<String>,
    ignored_dependencies: HashSet<String>,
}

impl AuditConfigBuilder {
    pub fn staleness(mut self, policy: StalenessPolicy) -> Self {
        self.staleness = Some(policy);
        self
    }

    pub fn network(mut self, network: NetworkConfig) -> Self {
        self.network = Some(network);
        self
    }

    pub fn manifest_file(mut self, name: impl Into<String>) -> Self {
        self.manifest_file = Some(name.into());
        self
    }

    pub fn ignore_dependency(mut self, name: impl Into<String>) -> Self {
        self.ignored_dependencies.insert(name.into());
        self
    }

    pub fn build(self) -> AuditConfig {
        AuditConfig {
            staleness: self.staleness.unwrap_or_default(),
            network: self.network.unwrap_or_default(),
            manifest_file: self
                .manifest_file
                .unwrap_or_else(|| DEFAULT_MANIFEST_FILE.to_string()),
            ignored_dependencies: self.ignored_dependencies,
        }
    }
}
