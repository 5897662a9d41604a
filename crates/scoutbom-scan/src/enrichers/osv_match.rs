//! Local OSV match enricher (spec §4.7): runs `scoutbom_osv::Matcher` for
//! every package and appends each match as a `PackageVuln`. Dedup across the
//! whole inventory happens once, at the end of the pipeline
//! (`Inventory::dedup_package_vulns`), not here.

use crate::plugin::Enricher;
use scoutbom_core::{Capabilities, Inventory, Network, PackageVuln, Plugin, VulnerabilityRef};
use scoutbom_osv::Matcher;
use std::collections::HashSet;
use std::sync::Mutex;

pub struct OsvMatchEnricher {
    matcher: Mutex<Matcher>,
}

impl OsvMatchEnricher {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            matcher: Mutex::new(matcher),
        }
    }
}

impl Plugin for OsvMatchEnricher {
    fn name(&self) -> &str {
        "osv-match-enricher"
    }

    fn version(&self) -> i32 {
        1
    }

    fn requirements(&self) -> Capabilities {
        Capabilities {
            network: Network::Offline,
            ..Capabilities::default()
        }
    }
}

impl Enricher for OsvMatchEnricher {
    fn enrich(&self, inventory: &mut Inventory) -> anyhow::Result<()> {
        let mut matcher = self.matcher.lock().unwrap();
        let mut findings = Vec::new();

        for package in &inventory.packages {
            for vuln in matcher.vulnerabilities_for(package) {
                let mut plugins = HashSet::new();
                plugins.insert(self.name().to_string());
                findings.push(PackageVuln {
                    vulnerability: VulnerabilityRef {
                        id: vuln.id,
                        aliases: vuln.aliases,
                        withdrawn: vuln.is_withdrawn(),
                        summary: None,
                    },
                    package_id: package.id,
                    exploitability_signals: package.exploitability_signals.clone(),
                    plugins,
                });
            }
        }

        for finding in findings {
            inventory.add_package_vuln(finding);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutbom_core::{Package, PackageId, PurlType};
    use scoutbom_osv::MatcherConfig;

    #[test]
    fn offline_with_empty_cache_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let matcher = Matcher::new(MatcherConfig {
            cache_dir: Some(dir.path().to_path_buf()),
            offline: true,
            ..Default::default()
        });
        let enricher = OsvMatchEnricher::new(matcher);

        let mut inv = Inventory::new();
        let id = inv.next_id();
        inv.packages.push(Package {
            id,
            name: "left-pad".to_string(),
            version: "1.0.0".to_string(),
            purl_type: Some(PurlType::Npm),
            locations: vec!["package.json".to_string()],
            plugins: HashSet::new(),
            metadata: None,
            source_code: None,
            layer_metadata: None,
            licenses: vec![],
            exploitability_signals: vec![],
        });

        enricher.enrich(&mut inv).unwrap();
        assert!(inv.package_vulns.is_empty());
    }
}
