//! Canonical ecosystem tags, their OSV names, and PURL construction.
//!
//! `PurlType` is the internal tag a `Package` carries; `Ecosystem` is the
//! name OSV databases and the remote matcher APIs use. The mapping between
//! the two is bidirectional and pure.

use serde::{Deserialize, Serialize};

/// Package URL type tag carried by a `Package`. Absence (`Package::purl_type
/// == None`) means "ecosystemless" per the data model invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurlType {
    Npm,
    Maven,
    PyPI,
    Golang,
    Cargo,
    NuGet,
    Gem,
    Composer,
    Apk,
    Deb,
    Rpm,
}

impl PurlType {
    /// All known variants, used by exhaustive mapping tests.
    pub const ALL: &'static [PurlType] = &[
        PurlType::Npm,
        PurlType::Maven,
        PurlType::PyPI,
        PurlType::Golang,
        PurlType::Cargo,
        PurlType::NuGet,
        PurlType::Gem,
        PurlType::Composer,
        PurlType::Apk,
        PurlType::Deb,
        PurlType::Rpm,
    ];

    /// The OSV ecosystem name this PURL type maps to. Pure and deterministic,
    /// as the data model requires of `Package::ecosystem()`.
    pub fn ecosystem(self) -> &'static str {
        match self {
            PurlType::Npm => "npm",
            PurlType::Maven => "Maven",
            PurlType::PyPI => "PyPI",
            PurlType::Golang => "Go",
            PurlType::Cargo => "crates.io",
            PurlType::NuGet => "NuGet",
            PurlType::Gem => "RubyGems",
            PurlType::Composer => "Packagist",
            PurlType::Apk => "Alpine",
            PurlType::Deb => "Debian",
            PurlType::Rpm => "Red Hat",
        }
    }

    /// The `pkg:` scheme component used when constructing a PURL string.
    pub fn purl_scheme(self) -> &'static str {
        match self {
            PurlType::Npm => "npm",
            PurlType::Maven => "maven",
            PurlType::PyPI => "pypi",
            PurlType::Golang => "golang",
            PurlType::Cargo => "cargo",
            PurlType::NuGet => "nuget",
            PurlType::Gem => "gem",
            PurlType::Composer => "composer",
            PurlType::Apk => "apk",
            PurlType::Deb => "deb",
            PurlType::Rpm => "rpm",
        }
    }

    /// Reverse lookup: the PURL type for a given OSV ecosystem name, if known.
    pub fn from_ecosystem(ecosystem: &str) -> Option<PurlType> {
        Self::ALL.iter().copied().find(|t| t.ecosystem() == ecosystem)
    }
}

/// Build a PURL string for a package, handling the namespace conventions
/// that differ across ecosystems (Maven's `group:artifact`, npm's `@scope`,
/// Go's import-path namespace).
pub fn build_purl(
    purl_type: PurlType,
    namespace: Option<&str>,
    name: &str,
    version: &str,
) -> String {
    let scheme = purl_type.purl_scheme();
    match (purl_type, namespace) {
        (PurlType::Maven, Some(ns)) => format!("pkg:{scheme}/{ns}/{name}@{version}"),
        (PurlType::Npm, Some(ns)) if ns.starts_with('@') => {
            format!("pkg:{scheme}/{ns}/{name}@{version}")
        }
        (PurlType::Golang, Some(ns)) => format!("pkg:{scheme}/{ns}/{name}@{version}"),
        (_, Some(ns)) => format!("pkg:{scheme}/{ns}/{name}@{version}"),
        (_, None) => format!("pkg:{scheme}/{name}@{version}"),
    }
}

/// The synthetic ecosystem used for ecosystemless packages identified only by
/// a source-code commit and a version.
pub const GIT_ECOSYSTEM: &str = "GIT";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecosystem_mapping_is_bidirectional() {
        for t in PurlType::ALL {
            let eco = t.ecosystem();
            assert_eq!(PurlType::from_ecosystem(eco), Some(*t));
        }
    }

    #[test]
    fn unknown_ecosystem_has_no_purl_type() {
        assert_eq!(PurlType::from_ecosystem("Nonexistent"), None);
    }

    #[test]
    fn maven_purl_includes_group_as_namespace() {
        let purl = build_purl(PurlType::Maven, Some("com.example"), "widget", "1.0.0");
        assert_eq!(purl, "pkg:maven/com.example/widget@1.0.0");
    }

    #[test]
    fn npm_scoped_purl_keeps_scope_segment() {
        let purl = build_purl(PurlType::Npm, Some("@types"), "node", "18.0.0");
        assert_eq!(purl, "pkg:npm/@types/node@18.0.0");
    }

    #[test]
    fn purl_without_namespace_omits_segment() {
        let purl = build_purl(PurlType::Cargo, None, "serde", "1.0.0");
        assert_eq!(purl, "pkg:cargo/serde@1.0.0");
    }
}
