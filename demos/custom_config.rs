//! Example showing custom configuration

use npm_graveyard_audit::{
    audit_project, AuditConfig, CheckTarget, NetworkConfig, NullSink, StalenessPolicy,
};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AuditConfig::builder()
        .staleness(StalenessPolicy {
            stale_days: 365,                      // 1 year instead of 2
            check_target: CheckTarget::Declared, // date the version we actually pin
        })
        .network(NetworkConfig {
            timeout_secs: 10,
            concurrency: 8, // findings still come back in manifest order
            ..NetworkConfig::default()
        })
        .ignore_dependency("@acme/internal")
        .build();

    config.validate()?;

    println!("Auditing with custom configuration...\n");
    let report = audit_project(Path::new("."), &config, &NullSink).await?;

    println!("=== Custom Audit Results ===");
    println!("Project: {}", report.project_name);
    println!("Issues: {}", report.summary.total_issues);

    for finding in &report.issues {
        match &finding.detail {
            Some(detail) => println!("  - {} ({}): {}", finding.name, finding.verdict, detail),
            None => println!(
                "  - {} {} declared as {} ({})",
                finding.name,
                finding.version.as_deref().unwrap_or("?"),
                finding.declared,
                finding.verdict
            ),
        }
    }

    Ok(())
}
