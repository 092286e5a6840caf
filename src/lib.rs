//! # npm_graveyard_audit
//!
//! Audits the dependencies declared in an npm `package.json` and flags
//! "graveyard candidates": packages whose latest release is older than a
//! staleness threshold (two years by default).
//!
//! ## Quick Start
//!
//! ```no_run
//! use npm_graveyard_audit::{audit_project, AuditConfig, NullSink};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = AuditConfig::default();
//! let report = audit_project(Path::new("."), &config, &NullSink).await?;
//!
//! for finding in &report.issues {
//!     println!("{}: {}", finding.name, finding.verdict);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Progress is reported through an [`EventSink`]; any `Fn(&AuditEvent)`
//! closure works as one.

mod audit;
mod config;
mod error;
mod events;
mod metadata;
mod parser;
mod scoring;
mod types;

// Re-export public API
pub use audit::{audit_project, audit_project_at};
pub use config::{
    AuditConfig, AuditConfigBuilder, CheckTarget, NetworkConfig, StalenessPolicy,
    DEFAULT_MANIFEST_FILE, DEFAULT_REGISTRY_URL,
};
pub use error::{AuditError, Result};
pub use events::{AuditEvent, EventSink, NullSink};
pub use metadata::{NpmRegistryClient, USER_AGENT};
pub use parser::{load as load_manifest, load_dir as load_manifest_dir};
pub use scoring::{classify, Classification};
pub use types::{
    AuditReport, AuditSummary, DependencySet, Finding, RegistryLookup, RegistryRecord, Verdict,
};
