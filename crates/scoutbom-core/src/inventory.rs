//! The inventory data model: packages, secrets, and package-vulnerability
//! findings, plus the invariants that hold across a scan.

use crate::ecosystem::{PurlType, GIT_ECOSYSTEM};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use time::OffsetDateTime;

/// Stable per-scan package identity. Rust has no pointer across a
/// `Vec<Package>` that survives reordering, so every package gets one of
/// these when it is added to an `Inventory`, and `PackageVuln` references
/// packages by id rather than by pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId(pub u64);

/// Source-code provenance for a package, when known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCode {
    pub repo: String,
    pub commit: String,
}

/// Attribution to a container-image layer / base image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LayerMetadata {
    pub base_image_index: i32,
    /// Set by the base-image enricher's annotate-only mode (spec §9 open
    /// question) once it has decided this package came from a base layer.
    /// Left `false` until that enricher runs.
    #[serde(default)]
    pub attributed_base_image: bool,
}

/// Tagged metadata variant. Readers project by matching on the tag that
/// corresponds to the producing extractor's `PurlType`, rather than by a
/// runtime type assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PackageMetadata {
    Npm { resolved: Option<String> },
    Maven { group_id: String, artifact_id: String },
    PyPI { requires_python: Option<String> },
    Go { module_path: String },
    Cargo { features: Vec<String> },
    NuGet { target_framework: Option<String> },
    Gem { platform: Option<String> },
    Composer {},
    /// Catch-all for ecosystemless or speculative extractors. Producers that
    /// don't yet have a dedicated variant should emit this rather than
    /// leaving `metadata` unset.
    Opaque(serde_json::Value),
}

/// VEX-style exploitability projection attached to a package, consumed to
/// build `PackageVuln::exploitability_signals` at match time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExploitabilityStatus {
    NotAffected,
    Affected,
    Fixed,
    UnderInvestigation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExploitabilitySignal {
    pub vulnerability_id: String,
    pub status: ExploitabilityStatus,
    pub justification: Option<String>,
}

/// A discovered software package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: PackageId,
    pub name: String,
    pub version: String,
    pub purl_type: Option<PurlType>,
    /// Ordered, filesystem-relative locations. Invariant: nonempty.
    pub locations: Vec<String>,
    pub plugins: HashSet<String>,
    pub metadata: Option<PackageMetadata>,
    pub source_code: Option<SourceCode>,
    pub layer_metadata: Option<LayerMetadata>,
    pub licenses: Vec<String>,
    pub exploitability_signals: Vec<ExploitabilitySignal>,
}

impl Package {
    /// The ecosystem name this package belongs to, or the synthetic `GIT`
    /// ecosystem for an ecosystemless package that carries a version. Pure
    /// and deterministic per the data model invariant.
    pub fn ecosystem(&self) -> Option<&'static str> {
        match self.purl_type {
            Some(t) => Some(t.ecosystem()),
            None if !self.version.is_empty() => Some(GIT_ECOSYSTEM),
            None => None,
        }
    }

    /// A package is valid only with a nonempty name and at least one
    /// location; extractors that can't satisfy this must drop the package
    /// rather than emit it.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.locations.is_empty()
    }
}

/// Secret variants. Each carries the minimum cleartext plus optional
/// enrichment fields populated by expiration enrichers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SecretKind {
    BitwardenApiKey {
        client_id: String,
        client_secret: String,
    },
    HerokuApiKey {
        key: String,
    },
    IbmCloudApiKey {
        key: String,
    },
    NuGetApiKey {
        key: String,
    },
    Generic {
        value: String,
    },
}

/// A located secret and its lifecycle metadata. Expiration fields are
/// populated by expiration-checking enrichers after initial detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub location: String,
    pub secret: SecretKind,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expire_time: Option<OffsetDateTime>,
    pub never_expires: bool,
    pub metadata: serde_json::Value,
}

impl Secret {
    pub fn new(location: impl Into<String>, secret: SecretKind) -> Self {
        Self {
            location: location.into(),
            secret,
            expire_time: None,
            never_expires: false,
            metadata: serde_json::Value::Null,
        }
    }
}

/// An OSV-shaped vulnerability record, kept minimal here; the full record
/// (affected ranges, severity) is owned by `scoutbom-osv` and passed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityRef {
    pub id: String,
    pub aliases: Vec<String>,
    pub withdrawn: bool,
    pub summary: Option<String>,
}

/// A vulnerability finding attached to a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageVuln {
    pub vulnerability: VulnerabilityRef,
    pub package_id: PackageId,
    pub exploitability_signals: Vec<ExploitabilitySignal>,
    pub plugins: HashSet<String>,
}

/// The in-memory record of what a scan found. Single-owner during a scan;
/// enrichers may reorder, delete, or mutate entries but must preserve the
/// invariants (nonempty locations, no withdrawn vulns, at most one
/// `PackageVuln` per `(package, vuln id)` pair after dedup).
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Inventory {
    pub packages: Vec<Package>,
    pub secrets: Vec<Secret>,
    pub package_vulns: Vec<PackageVuln>,
    next_package_id: u64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next package id without adding a package (used when a
    /// caller needs the id before the package record is fully built).
    pub fn next_id(&mut self) -> PackageId {
        let id = PackageId(self.next_package_id);
        self.next_package_id += 1;
        id
    }

    /// Append a package, dropping it and logging a warning if it fails the
    /// validity invariant rather than letting a malformed record through.
    pub fn add_package(&mut self, package: Package) {
        if !package.is_valid() {
            tracing::warn!(name = %package.name, "dropping invalid package: missing name or locations");
            return;
        }
        self.packages.push(package);
    }

    pub fn add_secret(&mut self, secret: Secret) {
        self.secrets.push(secret);
    }

    /// Append a finding, dropping it if the underlying vulnerability is
    /// withdrawn.
    pub fn add_package_vuln(&mut self, vuln: PackageVuln) {
        if vuln.vulnerability.withdrawn {
            return;
        }
        self.package_vulns.push(vuln);
    }

    /// Merge `PackageVulns` that share a `(package_id, Vulnerability.Id)`
    /// key. On collision the later entry in iteration order wins for all
    /// fields except `plugins`, whose sets are unioned.
    ///
    /// Aliases are never used for dedup: only exact `Vulnerability.Id`
    /// equality collapses two findings.
    pub fn dedup_package_vulns(&mut self) {
        let mut by_key: HashMap<(PackageId, String), usize> = HashMap::new();
        let mut merged: Vec<PackageVuln> = Vec::with_capacity(self.package_vulns.len());

        for vuln in self.package_vulns.drain(..) {
            let key = (vuln.package_id, vuln.vulnerability.id.clone());
            if let Some(&idx) = by_key.get(&key) {
                let existing_plugins = std::mem::take(&mut merged[idx].plugins);
                let mut plugins = vuln.plugins.clone();
                plugins.extend(existing_plugins);
                merged[idx] = vuln;
                merged[idx].plugins = plugins;
            } else {
                by_key.insert(key, merged.len());
                merged.push(vuln);
            }
        }

        self.package_vulns = merged;
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pkg(id: u64, name: &str) -> Package {
        Package {
            id: PackageId(id),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            purl_type: Some(PurlType::Npm),
            locations: vec!["package.json".to_string()],
            plugins: HashSet::new(),
            metadata: None,
            source_code: None,
            layer_metadata: None,
            licenses: vec![],
            exploitability_signals: vec![],
        }
    }

    fn vuln_ref(id: &str, withdrawn: bool) -> VulnerabilityRef {
        VulnerabilityRef {
            id: id.to_string(),
            aliases: vec![],
            withdrawn,
            summary: None,
        }
    }

    #[test]
    fn package_without_locations_is_invalid() {
        let mut p = pkg(1, "left-pad");
        p.locations.clear();
        assert!(!p.is_valid());
    }

    #[test]
    fn package_without_name_is_invalid() {
        let mut p = pkg(1, "");
        assert!(!p.is_valid());
        p.name = "ok".to_string();
        assert!(p.is_valid());
    }

    #[test]
    fn ecosystemless_package_with_version_uses_git_ecosystem() {
        let mut p = pkg(1, "vendored-thing");
        p.purl_type = None;
        assert_eq!(p.ecosystem(), Some("GIT"));
    }

    #[test]
    fn ecosystemless_package_without_version_has_no_ecosystem() {
        let mut p = pkg(1, "vendored-thing");
        p.purl_type = None;
        p.version = String::new();
        assert_eq!(p.ecosystem(), None);
    }

    #[test]
    fn withdrawn_vulnerabilities_are_never_added() {
        let mut inv = Inventory::new();
        inv.add_package_vuln(PackageVuln {
            vulnerability: vuln_ref("GHSA-xxxx", true),
            package_id: PackageId(1),
            exploitability_signals: vec![],
            plugins: HashSet::new(),
        });
        assert!(inv.package_vulns.is_empty());
    }

    #[test]
    fn dedup_unions_plugins_and_keeps_one_entry_per_key() {
        let mut inv = Inventory::new();
        let mut plugins_a = HashSet::new();
        plugins_a.insert("osv-matcher".to_string());
        let mut plugins_b = HashSet::new();
        plugins_b.insert("netscaler-detector".to_string());

        inv.add_package_vuln(PackageVuln {
            vulnerability: vuln_ref("CVE-2025-7775", false),
            package_id: PackageId(1),
            exploitability_signals: vec![],
            plugins: plugins_a,
        });
        inv.add_package_vuln(PackageVuln {
            vulnerability: vuln_ref("CVE-2025-7775", false),
            package_id: PackageId(1),
            exploitability_signals: vec![],
            plugins: plugins_b,
        });

        inv.dedup_package_vulns();
        assert_eq!(inv.package_vulns.len(), 1);
        assert_eq!(inv.package_vulns[0].plugins.len(), 2);
    }

    #[test]
    fn aliases_do_not_cause_dedup() {
        let mut inv = Inventory::new();
        let mut v1 = vuln_ref("CVE-2025-1", false);
        v1.aliases = vec!["GHSA-aaaa".to_string()];
        let mut v2 = vuln_ref("GHSA-aaaa", false);
        v2.aliases = vec!["CVE-2025-1".to_string()];

        inv.add_package_vuln(PackageVuln {
            vulnerability: v1,
            package_id: PackageId(1),
            exploitability_signals: vec![],
            plugins: HashSet::new(),
        });
        inv.add_package_vuln(PackageVuln {
            vulnerability: v2,
            package_id: PackageId(1),
            exploitability_signals: vec![],
            plugins: HashSet::new(),
        });

        inv.dedup_package_vulns();
        assert_eq!(inv.package_vulns.len(), 2, "alias overlap must not merge findings");
    }

    #[test]
    fn distinct_packages_keep_separate_findings_for_same_vuln() {
        let mut inv = Inventory::new();
        inv.add_package_vuln(PackageVuln {
            vulnerability: vuln_ref("CVE-2025-1", false),
            package_id: PackageId(1),
            exploitability_signals: vec![],
            plugins: HashSet::new(),
        });
        inv.add_package_vuln(PackageVuln {
            vulnerability: vuln_ref("CVE-2025-1", false),
            package_id: PackageId(2),
            exploitability_signals: vec![],
            plugins: HashSet::new(),
        });
        inv.dedup_package_vulns();
        assert_eq!(inv.package_vulns.len(), 2);
    }
}
