//! The guided-remediation affectedness/severity filter: reuses
//! `scoutbom_osv`'s event-sorted affectedness predicate and ecosystem
//! comparators, adding CVSS severity thresholding and the
//! `DevOnly`/`Subgraphs` attributes a downstream remediation tool filters
//! findings on.

pub mod remediation;
pub mod severity;
pub mod subgraph;

pub use remediation::{is_remediation_candidate, RemediationConfig, RemediationVuln};
pub use severity::{max_score as max_severity_score, passes_threshold as passes_severity_threshold};
pub use subgraph::{min_distance, Subgraph};
