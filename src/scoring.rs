//! Freshness classification for resolved packages

use crate::config::{CheckTarget, StalenessPolicy};
use crate::error::{AuditError, Result};
use crate::types::{RegistryRecord, Verdict};
use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Result of dating one package
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Version whose publish time was used
    pub version: String,
    pub published_at: DateTime<Utc>,
    pub age_days: f64,
    pub verdict: Verdict,
}

/// Classify a package as fresh or stale.
///
/// The evaluated version is the `latest` dist-tag unless the policy targets
/// the declared constraint. Deprecation flags are not consulted.
pub fn classify(
    package_name: &str,
    record: &RegistryRecord,
    declared: &str,
    now: DateTime<Utc>,
    policy: &StalenessPolicy,
) -> Result<Classification> {
    let version = match policy.check_target {
        CheckTarget::Latest => record.latest_version.as_str(),
        CheckTarget::Declared => exact_version(declared),
    };

    let published_at = *record.publish_times.get(version).ok_or_else(|| {
        let message = match policy.check_target {
            CheckTarget::Latest => format!("latest version {} has no publish time", version),
            CheckTarget::Declared => {
                format!("declared version {} has no publish time", declared)
            }
        };
        AuditError::inconsistency(package_name, message)
    })?;

    let age_days = age_in_days(published_at, now);

    Ok(Classification {
        version: version.to_string(),
        published_at,
        age_days,
        verdict: determine_verdict(age_days, policy),
    })
}

/// Fractional days elapsed between `published_at` and `now`
pub fn age_in_days(published_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    now.signed_duration_since(published_at).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Strictly older than the threshold is stale
pub fn determine_verdict(age_days: f64, policy: &StalenessPolicy) -> Verdict {
    if age_days > f64::from(policy.stale_days) {
        Verdict::Stale
    } else {
        Verdict::Fresh
    }
}

/// Reduce a declared constraint such as `^1.2.0` to the version it names
fn exact_version(declared: &str) -> &str {
    declared
        .trim()
        .trim_start_matches(|c| matches!(c, '^' | '~' | '=' | 'v'))
        .trim()
}
