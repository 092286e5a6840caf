//! Parser for package.json to extract declared dependencies

use crate::error::{AuditError, Result};
use crate::types::DependencySet;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// The parts of package.json the audit reads
#[derive(Debug, Deserialize)]
struct PackageManifest {
    /// Only used for report headings, so any JSON value is accepted
    #[serde(default)]
    name: Option<serde_json::Value>,
    /// `null` is treated like an absent section
    #[serde(default)]
    dependencies: Option<IndexMap<String, String>>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Option<IndexMap<String, String>>,
}

/// Load the dependency set declared by the manifest at `manifest_path`.
///
/// Runtime and development dependencies are merged; a name declared in both
/// keeps its first position and takes the `devDependencies` constraint.
pub fn load(manifest_path: &Path) -> Result<DependencySet> {
    let manifest = read_manifest(manifest_path)?;

    let mut deps = manifest.dependencies.unwrap_or_default();
    for (name, constraint) in manifest.dev_dependencies.unwrap_or_default() {
        deps.insert(name, constraint);
    }

    Ok(deps)
}

/// Load the dependency set from `file_name` inside `project_dir`
pub fn load_dir(project_dir: &Path, file_name: &str) -> Result<DependencySet> {
    load(&project_dir.join(file_name))
}

/// Get the name of the project from its manifest, falling back to the directory name
pub fn project_name(manifest_path: &Path) -> Result<String> {
    let manifest = read_manifest(manifest_path)?;

    if let Some(serde_json::Value::String(name)) = manifest.name {
        if !name.trim().is_empty() {
            return Ok(name);
        }
    }

    Ok(manifest_path
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string()))
}

fn read_manifest(manifest_path: &Path) -> Result<PackageManifest> {
    if !manifest_path.is_file() {
        return Err(AuditError::ManifestNotFound(manifest_path.to_path_buf()));
    }

    let content = std::fs::read_to_string(manifest_path)?;
    serde_json::from_str(&content).map_err(|e| {
        AuditError::manifest_parse(format!("{}: {}", manifest_path.display(), e))
    })
}
