//! CLI tool for finding abandoned npm dependencies

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use npm_graveyard_audit::{
    audit_project, AuditConfig, AuditEvent, AuditReport, CheckTarget, Finding, Verdict,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "graveyard-audit")]
#[command(about = "Find abandoned npm dependencies by checking registry publish dates", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Dependencies to ignore (can be specified multiple times)
    #[arg(long = "ignore", global = true)]
    ignore_dependencies: Vec<String>,

    /// Days since last publish before a dependency is flagged
    #[arg(long, global = true)]
    stale_days: Option<u32>,

    /// Version to date: "latest" or "declared"
    #[arg(long, global = true)]
    check_target: Option<CheckTarget>,

    /// Maximum registry lookups in flight
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", global = true)]
    timeout_secs: Option<u64>,

    /// Registry base URL
    #[arg(long, global = true)]
    registry: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find abandoned and deprecated dependencies
    Audit {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Also list dependencies that look fresh
        #[arg(long)]
        detailed: bool,

        /// Exit with a failure code when any issue is found
        #[arg(long)]
        fail_on_issues: bool,
    },

    /// Generate a full audit report
    Report {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output format
        #[arg(short = 'f', long, default_value = "markdown")]
        format: ReportFormat,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Debug)]
enum ReportFormat {
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{} Failed to load config: {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Audit {
            dir,
            detailed,
            fail_on_issues,
        } => {
            let report = run_progressive(&dir, &config, detailed).await;

            if report.is_clean() {
                println!(
                    "{}",
                    "✨ No graveyards found. Dependencies look fresh.".green()
                );
            } else {
                println!(
                    "{}",
                    format!("Found {} potential issues.", report.summary.total_issues).yellow()
                );
                if fail_on_issues {
                    process::exit(1);
                }
            }
        }

        Commands::Report {
            dir,
            format,
            output,
        } => {
            let report = run_quiet(&dir, &config).await;
            let content = match format {
                ReportFormat::Json => generate_json_report(&report),
                ReportFormat::Markdown => generate_markdown_report(&report),
            };

            if let Some(output_path) = output {
                match std::fs::write(&output_path, content) {
                    Ok(_) => println!("Report written to: {}", output_path.display()),
                    Err(e) => {
                        eprintln!("{} Failed to write report: {}", "Error:".red().bold(), e);
                        process::exit(1);
                    }
                }
            } else {
                println!("{}", content);
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<AuditConfig> {
    let mut config = match &cli.config {
        Some(path) => AuditConfig::from_toml_file(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => AuditConfig::default(),
    };

    for dep in &cli.ignore_dependencies {
        config.ignored_dependencies.insert(dep.clone());
    }
    if let Some(days) = cli.stale_days {
        config.staleness.stale_days = days;
    }
    if let Some(target) = cli.check_target {
        config.staleness.check_target = target;
    }
    if let Some(concurrency) = cli.concurrency {
        config.network.concurrency = concurrency;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.network.timeout_secs = timeout;
    }
    if let Some(registry) = &cli.registry {
        config.network.registry_url = registry.clone();
    }

    config.validate()?;
    info!("Using registry {}", config.network.registry_url);
    Ok(config)
}

fn new_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Checking registry...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Run the audit, printing each finding as it arrives
async fn run_progressive(dir: &Path, config: &AuditConfig, detailed: bool) -> AuditReport {
    let spinner = new_spinner();
    let target = config.staleness.check_target;

    let sink = |event: &AuditEvent| match event {
        AuditEvent::ScanStarted { count } => spinner.suspend(|| {
            println!(
                "{}",
                format!("🔍 Scanning {} dependencies...", count).blue()
            )
        }),
        AuditEvent::Checking { name, .. } => spinner.set_message(format!("Checking {}...", name)),
        AuditEvent::Finding(finding) => {
            if let Some(line) = finding_line(finding, target, detailed) {
                spinner.suspend(|| println!("{}", line));
            }
        }
        AuditEvent::ScanComplete { .. } => spinner.finish_and_clear(),
    };

    let result = audit_project(dir, config, &sink).await;
    spinner.finish_and_clear();
    unwrap_or_exit(result)
}

/// Run the audit with only a spinner for feedback
async fn run_quiet(dir: &Path, config: &AuditConfig) -> AuditReport {
    let spinner = new_spinner();

    let sink = |event: &AuditEvent| {
        if let AuditEvent::Checking { name, index, total } = event {
            spinner.set_message(format!("[{}/{}] Checking {}...", index + 1, total, name));
        }
    };

    let result = audit_project(dir, config, &sink).await;
    spinner.finish_and_clear();
    unwrap_or_exit(result)
}

fn unwrap_or_exit(result: npm_graveyard_audit::Result<AuditReport>) -> AuditReport {
    match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} {}", "❌".red(), format!("Audit failed: {}", e).red());
            process::exit(1);
        }
    }
}

fn finding_line(finding: &Finding, target: CheckTarget, detailed: bool) -> Option<ColoredString> {
    let line = match finding.verdict {
        Verdict::Stale => {
            let headline = match target {
                CheckTarget::Latest => "Abandoned?",
                CheckTarget::Declared => "Stale pin?",
            };
            format!(
                "💀 {}: {} {}",
                finding.name,
                headline,
                publish_summary(finding, target)
            )
            .red()
        }
        Verdict::Unresolved => {
            format!("⚠️  {}: Not found in registry (private?)", finding.name).yellow()
        }
        Verdict::LookupError => format!(
            "❗ {}: Lookup failed ({})",
            finding.name,
            finding.detail.as_deref().unwrap_or("unknown error")
        )
        .yellow(),
        Verdict::Fresh if detailed => {
            format!("✓ {}: {}", finding.name, publish_summary(finding, target)).green()
        }
        Verdict::Fresh => return None,
    };
    Some(line)
}

/// Describe the dated version: the package's last update, or the declared pin
fn publish_summary(finding: &Finding, target: CheckTarget) -> String {
    match target {
        CheckTarget::Latest => format!(
            "Last update {} ({} days ago)",
            last_update(finding),
            age_whole_days(finding)
        ),
        CheckTarget::Declared => format!(
            "Declared version {} published {} ({} days ago)",
            finding.version.as_deref().unwrap_or(&finding.declared),
            last_update(finding),
            age_whole_days(finding)
        ),
    }
}

fn last_update(finding: &Finding) -> String {
    finding
        .published_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn age_whole_days(finding: &Finding) -> i64 {
    finding.age_days.map(|d| d.floor() as i64).unwrap_or(0)
}

fn generate_json_report(report: &AuditReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| {
        eprintln!("Failed to serialize report: {}", e);
        process::exit(1);
    })
}

fn generate_markdown_report(report: &AuditReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Dependency Graveyard Report: {}\n\n", report.project_name));
    md.push_str(&format!("**Generated:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!(
        "- Total dependencies: {}\n",
        report.summary.total_dependencies
    ));
    md.push_str(&format!("- Fresh: {}\n", report.summary.fresh));
    md.push_str(&format!("- Stale: {}\n", report.summary.stale));
    md.push_str(&format!("- Unresolved: {}\n", report.summary.unresolved));
    md.push_str(&format!("- Lookup errors: {}\n", report.summary.lookup_errors));
    md.push_str(&format!("- Total issues: {}\n\n", report.summary.total_issues));

    if report.issues.is_empty() {
        md.push_str("No graveyards found. Dependencies look fresh.\n");
        return md;
    }

    md.push_str("## Issues\n\n");
    md.push_str("| Name | Declared | Version | Verdict | Last update | Age (days) |\n");
    md.push_str("|------|----------|---------|---------|-------------|------------|\n");

    for finding in &report.issues {
        let age = finding
            .age_days
            .map(|d| format!("{}", d.floor() as i64))
            .unwrap_or_else(|| "-".to_string());
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            finding.name,
            finding.declared,
            finding.version.as_deref().unwrap_or("-"),
            finding.verdict,
            finding
                .published_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            age
        ));
    }

    md
}
