//! Dependency-subgraph distance (spec glossary: "Subgraph distance: depth
//! from the root of a dependency graph to a given node"). A vulnerable
//! package can be reachable from the root manifest through more than one
//! dependency path; `Subgraph` records one such path's distance so the
//! remediation filter can bound how deep it is willing to act.

/// One path from a root dependency to the vulnerable package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subgraph {
    pub distance: u32,
}

impl Subgraph {
    pub fn root() -> Self {
        Self { distance: 0 }
    }
}

/// The shortest of several subgraph distances, or `None` if the package is
/// unreachable from any tracked root (an empty subgraph list).
pub fn min_distance(subgraphs: &[Subgraph]) -> Option<u32> {
    subgraphs.iter().map(|s| s.distance).min()
}
