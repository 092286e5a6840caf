//! Error types for the audit system

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Main error type for audit operations
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("No manifest found at {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("Registry lookup failed for {package}: {message}")]
    Lookup { package: String, message: String },

    #[error("Inconsistent registry metadata for {package}: {message}")]
    MetadataInconsistency { package: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl AuditError {
    /// Create a manifest parse error
    pub fn manifest_parse(msg: impl Into<String>) -> Self {
        Self::ManifestParse(msg.into())
    }

    /// Create a registry lookup error
    pub fn lookup(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Create a metadata inconsistency error
    pub fn inconsistency(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MetadataInconsistency {
            package: package.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Whether this error prevents the dependency set from being established.
    ///
    /// Everything else is local to one dependency and degrades to a finding.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ManifestNotFound(_)
                | Self::ManifestParse(_)
                | Self::ConfigError(_)
                | Self::IoError(_)
                | Self::TomlError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(AuditError::ManifestNotFound(PathBuf::from("package.json")).is_fatal());
        assert!(AuditError::manifest_parse("bad").is_fatal());
        assert!(!AuditError::lookup("left-pad", "HTTP 500").is_fatal());
        assert!(!AuditError::inconsistency("left-pad", "no time entry").is_fatal());
    }

    #[test]
    fn test_display_includes_package() {
        let err = AuditError::lookup("left-pad", "HTTP 503");
        assert_eq!(
            err.to_string(),
            "Registry lookup failed for left-pad: HTTP 503"
        );
    }
}
