//! npm package extractor: resolves exact versions from `package-lock.json`
//! when present, falling back to the version ranges declared in
//! `package.json` otherwise.

use crate::fs::ScanFileSystem;
use crate::plugin::Extractor;
use scoutbom_core::{Capabilities, Inventory, Package, PackageMetadata, Plugin, PurlType};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub struct NpmExtractor;

impl Plugin for NpmExtractor {
    fn name(&self) -> &str {
        "npm-extractor"
    }

    fn version(&self) -> i32 {
        1
    }

    fn requirements(&self) -> Capabilities {
        Capabilities::default()
    }
}

impl Extractor for NpmExtractor {
    fn wants_file(&self, relative_path: &Path) -> bool {
        matches!(
            relative_path.file_name().and_then(|n| n.to_str()),
            Some("package.json") | Some("package-lock.json")
        )
    }

    fn extract(
        &self,
        fs: &dyn ScanFileSystem,
        relative_path: &Path,
        inventory: &mut Inventory,
    ) -> anyhow::Result<()> {
        let file_name = relative_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        match file_name {
            "package-lock.json" => extract_from_lockfile(fs, relative_path, inventory),
            "package.json" => {
                let lockfile = relative_path.with_file_name("package-lock.json");
                if fs.exists(&lockfile) {
                    // The lockfile extractor pass (run for its own path during
                    // the walk) is authoritative; skip the manifest fallback.
                    Ok(())
                } else {
                    extract_from_manifest(fs, relative_path, inventory)
                }
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PackageLockJson {
    #[serde(default)]
    packages: HashMap<String, LockfilePackage>,
}

#[derive(Debug, Deserialize)]
struct LockfilePackage {
    version: Option<String>,
}

fn split_scope(name: &str) -> (Option<String>, String) {
    if let Some(rest) = name.strip_prefix('@') {
        if let Some((scope, pkg)) = rest.split_once('/') {
            return (Some(format!("@{scope}")), pkg.to_string());
        }
    }
    (None, name.to_string())
}

fn extract_from_manifest(
    fs: &dyn ScanFileSystem,
    relative_path: &Path,
    inventory: &mut Inventory,
) -> anyhow::Result<()> {
    let content = fs.read_to_string(relative_path)?;
    let manifest: PackageJson = serde_json::from_str(&content)?;

    for (name, range) in manifest.dependencies {
        let version = range.trim_start_matches(['^', '~', '=']).to_string();
        let id = inventory.next_id();
        let mut plugins = HashSet::new();
        plugins.insert("npm-extractor".to_string());
        inventory.add_package(Package {
            id,
            name,
            version,
            purl_type: Some(PurlType::Npm),
            locations: vec![relative_path.display().to_string()],
            plugins,
            metadata: Some(PackageMetadata::Npm { resolved: None }),
            source_code: None,
            layer_metadata: None,
            licenses: vec![],
            exploitability_signals: vec![],
        });
    }
    Ok(())
}

fn extract_from_lockfile(
    fs: &dyn ScanFileSystem,
    relative_path: &Path,
    inventory: &mut Inventory,
) -> anyhow::Result<()> {
    let content = fs.read_to_string(relative_path)?;
    let lock: PackageLockJson = serde_json::from_str(&content)?;

    for (path, entry) in lock.packages {
        if path.is_empty() {
            continue; // root project entry
        }
        let Some(version) = entry.version else { continue };
        let name = path.strip_prefix("node_modules/").unwrap_or(&path);
        let (scope, bare_name) = split_scope(name);
        let purl_name = match &scope {
            Some(s) => format!("{s}/{bare_name}"),
            None => bare_name,
        };

        let id = inventory.next_id();
        let mut plugins = HashSet::new();
        plugins.insert("npm-extractor".to_string());
        inventory.add_package(Package {
            id,
            name: purl_name,
            version,
            purl_type: Some(PurlType::Npm),
            locations: vec![relative_path.display().to_string()],
            plugins,
            metadata: Some(PackageMetadata::Npm { resolved: None }),
            source_code: None,
            layer_metadata: None,
            licenses: vec![],
            exploitability_signals: vec![],
        });
    }
    Ok(())
}
