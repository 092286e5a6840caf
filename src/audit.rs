//! Main audit orchestration logic

use crate::config::{AuditConfig, StalenessPolicy};
use crate::error::{AuditError, Result};
use crate::events::{AuditEvent, EventSink};
use crate::metadata::NpmRegistryClient;
use crate::parser;
use crate::scoring::classify;
use crate::types::{AuditReport, Finding, RegistryLookup};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::pin;
use tracing::{debug, info, warn};

/// Audit the npm project in `project_path`, dating packages against the current time
pub async fn audit_project<S>(
    project_path: &Path,
    config: &AuditConfig,
    sink: &S,
) -> Result<AuditReport>
where
    S: EventSink + ?Sized,
{
    audit_project_at(project_path, config, sink, Utc::now()).await
}

/// Audit the npm project in `project_path`, computing every age relative to `now`.
///
/// Fails only when the dependency set cannot be established. Per-dependency
/// failures become findings and the scan continues.
pub async fn audit_project_at<S>(
    project_path: &Path,
    config: &AuditConfig,
    sink: &S,
    now: DateTime<Utc>,
) -> Result<AuditReport>
where
    S: EventSink + ?Sized,
{
    config.validate()?;
    info!("Starting audit of project at: {}", project_path.display());

    let manifest_path = project_path.join(&config.manifest_file);
    let mut dependencies = parser::load(&manifest_path)?;
    let project_name = parser::project_name(&manifest_path)?;

    dependencies.retain(|name, _| {
        let keep = !config.ignored_dependencies.contains(name);
        if !keep {
            debug!("Skipping ignored dependency: {}", name);
        }
        keep
    });

    let total = dependencies.len();
    info!(
        "Found {} dependencies for project '{}'",
        total, project_name
    );

    // Dropped at the end of the run together with its connection pool
    let client = NpmRegistryClient::new(&config.network)?;
    let policy = &config.staleness;

    sink.emit(&AuditEvent::ScanStarted { count: total });

    // With concurrency 1 each lookup completes before the next one starts.
    let mut results = pin!(stream::iter(dependencies.iter().enumerate())
        .map(|(index, (name, declared))| {
            sink.emit(&AuditEvent::Checking {
                name: name.clone(),
                index,
                total,
            });
            let client = &client;
            async move {
                let finding = process_dependency(client, name, declared, now, policy).await;
                (index, finding)
            }
        })
        .buffer_unordered(config.network.concurrency));

    let mut collected = Vec::with_capacity(total);
    while let Some((index, finding)) = results.next().await {
        sink.emit(&AuditEvent::Finding(finding.clone()));
        collected.push((index, finding));
    }

    collected.sort_by_key(|(index, _)| *index);
    let findings = collected.into_iter().map(|(_, finding)| finding).collect();

    let report = AuditReport::from_findings(
        project_name,
        project_path.display().to_string(),
        now,
        findings,
    );

    sink.emit(&AuditEvent::ScanComplete {
        total: report.summary.total_dependencies,
        total_issues: report.summary.total_issues,
    });

    info!(
        "Audit complete: {}/{} fresh, {} stale, {} unresolved, {} lookup errors",
        report.summary.fresh,
        report.summary.total_dependencies,
        report.summary.stale,
        report.summary.unresolved,
        report.summary.lookup_errors,
    );

    Ok(report)
}

/// Process a single dependency. Always yields exactly one finding.
async fn process_dependency(
    client: &NpmRegistryClient,
    name: &str,
    declared: &str,
    now: DateTime<Utc>,
    policy: &StalenessPolicy,
) -> Finding {
    debug!("Processing dependency: {} {}", name, declared);

    let record = match client.resolve(name).await {
        Ok(RegistryLookup::Found(record)) => record,
        Ok(RegistryLookup::NotFound) => {
            debug!("{} not found in registry", name);
            return Finding::unresolved(name, declared);
        }
        Ok(RegistryLookup::Malformed(reason)) => {
            warn!("Malformed registry response for {}: {}", name, reason);
            return Finding::lookup_error(name, declared, reason);
        }
        Err(e) => {
            warn!("Failed to fetch registry metadata for {}: {}", name, e);
            return Finding::lookup_error(name, declared, failure_detail(e));
        }
    };

    match classify(name, &record, declared, now, policy) {
        Ok(c) => Finding {
            name: name.to_string(),
            declared: declared.to_string(),
            version: Some(c.version),
            published_at: Some(c.published_at),
            age_days: Some(c.age_days),
            verdict: c.verdict,
            detail: None,
        },
        Err(e) => {
            warn!("Could not classify {}: {}", name, e);
            Finding::lookup_error(name, declared, failure_detail(e))
        }
    }
}

fn failure_detail(error: AuditError) -> String {
    match error {
        AuditError::Lookup { message, .. } | AuditError::MetadataInconsistency { message, .. } => {
            message
        }
        other => other.to_string(),
    }
}
