//! Basic example of using the audit API

use npm_graveyard_audit::{audit_project, AuditConfig, AuditEvent, Verdict};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use default configuration: npm registry, 2 year threshold, latest version
    let config = AuditConfig::default();

    // Audit the current project
    let project_path = Path::new(".");
    println!("Auditing project at: {}", project_path.display());

    let print_progress = |event: &AuditEvent| {
        if let AuditEvent::Checking { name, index, total } = event {
            println!("  [{}/{}] {}", index + 1, total, name);
        }
    };

    let report = audit_project(project_path, &config, &print_progress).await?;

    println!("\n=== Audit Results ===");
    println!("Project: {}", report.project_name);
    println!("Total dependencies: {}", report.summary.total_dependencies);
    println!("  Fresh: {}", report.summary.fresh);
    println!("  Stale: {}", report.summary.stale);
    println!("  Unresolved: {}", report.summary.unresolved);
    println!("  Lookup errors: {}", report.summary.lookup_errors);
    println!();

    let stale: Vec<_> = report
        .issues
        .iter()
        .filter(|f| f.verdict == Verdict::Stale)
        .collect();

    if stale.is_empty() {
        println!("✓ No graveyard candidates found!");
    } else {
        println!("Graveyard candidates:");
        for finding in stale {
            println!(
                "  - {} {}: {:.0} days since last publish",
                finding.name,
                finding.version.as_deref().unwrap_or("?"),
                finding.age_days.unwrap_or_default()
            );
        }
    }

    Ok(())
}
