//! Core data types for dependency freshness reporting

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared dependencies in manifest order: package name -> version constraint
pub type DependencySet = IndexMap<String, String>;

/// Published metadata for one package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Version the registry's `latest` dist-tag points to
    pub latest_version: String,
    /// Publish time of each version
    pub publish_times: HashMap<String, DateTime<Utc>>,
}

/// Outcome of a registry lookup that reached the registry
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryLookup {
    Found(RegistryRecord),
    /// The registry does not know the package (private, unpublished, unlisted)
    NotFound,
    /// The registry answered but the body could not be understood
    Malformed(String),
}

/// Audit verdict for a single dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Fresh,
    /// Graveyard candidate: evaluated version older than the threshold
    Stale,
    /// Not found in the registry
    Unresolved,
    /// Transport, parse, or metadata failure
    LookupError,
}

impl Verdict {
    /// Whether this verdict counts towards the issue total
    pub fn is_issue(self) -> bool {
        !matches!(self, Verdict::Fresh)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => write!(f, "fresh"),
            Self::Stale => write!(f, "stale"),
            Self::Unresolved => write!(f, "unresolved"),
            Self::LookupError => write!(f, "lookup-error"),
        }
    }
}

/// Audit result for a single dependency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Package name
    pub name: String,
    /// Version constraint declared in the manifest
    pub declared: String,
    /// Version that was dated, when the registry resolved one
    pub version: Option<String>,
    /// Publish time of the evaluated version
    pub published_at: Option<DateTime<Utc>>,
    /// Fractional days between publish and evaluation time
    pub age_days: Option<f64>,
    pub verdict: Verdict,
    /// Failure description for unresolved and lookup-error findings
    pub detail: Option<String>,
}

impl Finding {
    pub(crate) fn unresolved(name: &str, declared: &str) -> Self {
        Self {
            name: name.to_string(),
            declared: declared.to_string(),
            version: None,
            published_at: None,
            age_days: None,
            verdict: Verdict::Unresolved,
            detail: Some("not found in registry".to_string()),
        }
    }

    pub(crate) fn lookup_error(name: &str, declared: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            declared: declared.to_string(),
            version: None,
            published_at: None,
            age_days: None,
            verdict: Verdict::LookupError,
            detail: Some(detail.into()),
        }
    }
}

/// Complete audit report for a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Name of the audited project
    pub project_name: String,
    /// Path to the audited project
    pub project_path: String,
    /// Evaluation time used for every age computation
    pub timestamp: DateTime<Utc>,
    /// Non-fresh findings in manifest order
    pub issues: Vec<Finding>,
    /// Summary statistics
    pub summary: AuditSummary,
}

/// Summary statistics for an audit report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total_dependencies: usize,
    pub fresh: usize,
    pub stale: usize,
    pub unresolved: usize,
    pub lookup_errors: usize,
    pub total_issues: usize,
}

impl AuditSummary {
    fn record(&mut self, verdict: Verdict) {
        self.total_dependencies += 1;
        match verdict {
            Verdict::Fresh => self.fresh += 1,
            Verdict::Stale => self.stale += 1,
            Verdict::Unresolved => self.unresolved += 1,
            Verdict::LookupError => self.lookup_errors += 1,
        }
        if verdict.is_issue() {
            self.total_issues += 1;
        }
    }
}

impl AuditReport {
    /// Build a finalized report from every finding of a scan, in manifest order
    pub fn from_findings(
        project_name: String,
        project_path: String,
        timestamp: DateTime<Utc>,
        findings: Vec<Finding>,
    ) -> Self {
        let mut summary = AuditSummary::default();
        let mut issues = Vec::new();

        for finding in findings {
            summary.record(finding.verdict);
            if finding.verdict.is_issue() {
                issues.push(finding);
            }
        }

        Self {
            project_name,
            project_path,
            timestamp,
            issues,
            summary,
        }
    }

    /// Whether no dependency was flagged
    pub fn is_clean(&self) -> bool {
        self.summary.total_issues == 0
    }
}
