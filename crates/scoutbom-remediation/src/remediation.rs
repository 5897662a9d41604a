//! The guided-remediation evaluator (spec §4.8): the same event-sorted
//! affectedness predicate `scoutbom-osv::affected` uses, layered with the
//! severity threshold and the `DevOnly`/`Subgraphs` attributes a downstream
//! remediation tool filters on.

use crate::severity::passes_threshold;
use crate::subgraph::{min_distance, Subgraph};
use scoutbom_core::Package;
use scoutbom_osv::Vulnerability;

/// A vulnerability finding as the remediation filter sees it: the
/// underlying OSV record plus the attributes spec.md §3 calls out
/// specifically for the affectedness/severity filter.
#[derive(Debug, Clone)]
pub struct RemediationVuln {
    pub vulnerability: Vulnerability,
    pub dev_only: bool,
    pub subgraphs: Vec<Subgraph>,
}

#[derive(Debug, Clone, Copy)]
pub struct RemediationConfig {
    /// Minimum CVSS score (or pass-through, if unknown) for a finding to
    /// remain actionable.
    pub severity_threshold: f64,
    /// When false, findings that are `dev_only` are filtered out up front —
    /// a remediation pass over production dependencies shouldn't act on
    /// dev-only vulnerabilities.
    pub include_dev_only: bool,
    /// When set, a finding is kept only if some subgraph places it within
    /// this many hops of the root manifest.
    pub max_distance: Option<u32>,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            severity_threshold: 0.0,
            include_dev_only: true,
            max_distance: None,
        }
    }
}

/// True iff `finding` is affectedness-, severity-, and reachability-eligible
/// for remediation against `package`.
pub fn is_remediation_candidate(finding: &RemediationVuln, package: &Package, cfg: &RemediationConfig) -> bool {
    if !cfg.include_dev_only && finding.dev_only {
        return false;
    }
    if let Some(max) = cfg.max_distance {
        match min_distance(&finding.subgraphs) {
            Some(distance) if distance <= max => {}
            _ => return false,
        }
    }
    if !scoutbom_osv::is_affected(&finding.vulnerability, package) {
        return false;
    }
    passes_threshold(&finding.vulnerability, cfg.severity_threshold)
}
