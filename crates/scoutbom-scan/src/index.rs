//! Typed lookup over the packages an extraction pass produced: built once
//! after extraction finishes (spec §4.9 step 3) and handed to every
//! detector so a detector can key its findings to an already-known package
//! without filtering the full package list by hand (spec §4.4).
//!
//! The index owns clones of the packages it was built from rather than
//! borrowing them, so it can be held alongside a `&mut Inventory` during the
//! detection pass (detectors may still add their own packages/findings to
//! the inventory; those additions don't retroactively appear in the index,
//! which reflects the package set as of the end of extraction).

use scoutbom_core::{Package, PurlType};
use std::collections::HashMap;

pub struct PackageIndex {
    by_type: HashMap<Option<PurlType>, Vec<Package>>,
}

impl PackageIndex {
    pub fn build(packages: &[Package]) -> Self {
        let mut by_type: HashMap<Option<PurlType>, Vec<Package>> = HashMap::new();
        for package in packages {
            by_type.entry(package.purl_type).or_default().push(package.clone());
        }
        Self { by_type }
    }

    /// All packages of the given PURL type, in insertion order. Empty slice
    /// if none were found, never an error.
    pub fn get_all_of_type(&self, purl_type: PurlType) -> &[Package] {
        self.by_type
            .get(&Some(purl_type))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Ecosystemless packages (no PURL type).
    pub fn get_ecosystemless(&self) -> &[Package] {
        self.by_type.get(&None).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pkg(purl_type: Option<PurlType>, name: &str) -> Package {
        Package {
            id: scoutbom_core::PackageId(0),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            purl_type,
            locations: vec!["x".to_string()],
            plugins: HashSet::new(),
            metadata: None,
            source_code: None,
            layer_metadata: None,
            licenses: vec![],
            exploitability_signals: vec![],
        }
    }

    #[test]
    fn groups_packages_by_purl_type() {
        let packages = vec![
            pkg(Some(PurlType::Npm), "left-pad"),
            pkg(Some(PurlType::Npm), "express"),
            pkg(Some(PurlType::Cargo), "serde"),
            pkg(None, "vendored"),
        ];
        let index = PackageIndex::build(&packages);

        assert_eq!(index.get_all_of_type(PurlType::Npm).len(), 2);
        assert_eq!(index.get_all_of_type(PurlType::Cargo).len(), 1);
        assert_eq!(index.get_all_of_type(PurlType::Maven).len(), 0);
        assert_eq!(index.get_ecosystemless().len(), 1);
    }

    #[test]
    fn index_is_a_snapshot_independent_of_later_inventory_mutation() {
        let packages = vec![pkg(Some(PurlType::Npm), "left-pad")];
        let index = PackageIndex::build(&packages);
        let mut packages = packages;
        packages.push(pkg(Some(PurlType::Npm), "express"));
        // The index doesn't see the later push; it owns its own snapshot.
        assert_eq!(index.get_all_of_type(PurlType::Npm).len(), 1);
    }
}
