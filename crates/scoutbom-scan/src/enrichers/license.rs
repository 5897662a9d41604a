//! License enricher (spec §4.7): resolves licenses for every package, with
//! bounded concurrency, applying the remote-known > extractor-known >
//! `UNKNOWN` precedence. Packages with no `PurlType` (ecosystemless) are
//! still fanned out — the lookup reports them not-found and they fall back
//! to `UNKNOWN` like any other not-found package.

use crate::license::{resolve_bounded, License, DEFAULT_MAX_CONCURRENCY};
use crate::plugin::Enricher;
use scoutbom_core::{Capabilities, Inventory, Network, Package, Plugin};
use std::sync::{Arc, Mutex};

/// A license lookup for one package. `Ok(None)` is "not found" — non-fatal,
/// per spec §4.7 ("NotFound is not fatal; returns empty licenses"). `Err` is
/// fatal for the whole enricher, mirroring deps.dev's "any other status
/// aborts the batch" contract.
pub trait LicenseLookup: Send + Sync {
    fn lookup(&self, package: &Package) -> Result<Option<Vec<String>>, anyhow::Error>;
}

impl<F> LicenseLookup for F
where
    F: Fn(&Package) -> Result<Option<Vec<String>>, anyhow::Error> + Send + Sync,
{
    fn lookup(&self, package: &Package) -> Result<Option<Vec<String>>, anyhow::Error> {
        self(package)
    }
}

pub struct LicenseEnricher {
    lookup: Arc<dyn LicenseLookup>,
    max_concurrency: usize,
}

impl LicenseEnricher {
    pub fn new(lookup: Arc<dyn LicenseLookup>) -> Self {
        Self {
            lookup,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max.max(1);
        self
    }
}

impl Plugin for LicenseEnricher {
    fn name(&self) -> &str {
        "license-enricher"
    }

    fn version(&self) -> i32 {
        1
    }

    fn requirements(&self) -> Capabilities {
        Capabilities {
            network: Network::Online,
            ..Capabilities::default()
        }
    }
}

impl Enricher for LicenseEnricher {
    fn enrich(&self, inventory: &mut Inventory) -> anyhow::Result<()> {
        // Every package goes through the fan-out, including ecosystemless
        // ones (no purl_type) — the lookup itself reports those as
        // not-found, and the fallback below turns not-found into UNKNOWN.
        let indices: Vec<usize> = (0..inventory.packages.len()).collect();
        if indices.is_empty() {
            return Ok(());
        }

        // Results are associated to their request by index, not completion
        // order, so per-package alignment survives the fan-out.
        let packages: Vec<&Package> = indices.iter().map(|&i| &inventory.packages[i]).collect();
        let error_slot: Arc<Mutex<Option<anyhow::Error>>> = Arc::new(Mutex::new(None));

        let remote: Vec<License> = {
            let error_slot = Arc::clone(&error_slot);
            let lookup = Arc::clone(&self.lookup);
            resolve_bounded(&packages, self.max_concurrency, move |pkg: &&Package| {
                if error_slot.lock().unwrap().is_some() {
                    return License::Unknown;
                }
                match lookup.lookup(pkg) {
                    Ok(Some(licenses)) if !licenses.is_empty() => {
                        License::Spdx(licenses.join(" OR "))
                    }
                    Ok(_) => License::Unknown,
                    Err(err) => {
                        let mut slot = error_slot.lock().unwrap();
                        if slot.is_none() {
                            *slot = Some(err);
                        }
                        License::Unknown
                    }
                }
            })
        };

        if let Some(err) = Arc::try_unwrap(error_slot)
            .map(|m| m.into_inner().unwrap())
            .unwrap_or(None)
        {
            return Err(err.context("license enrichment aborted on first non-notfound error"));
        }

        for (&pkg_idx, license) in indices.iter().zip(remote.iter()) {
            let package = &mut inventory.packages[pkg_idx];
            package.licenses = match license {
                License::Spdx(id) => vec![id.clone()],
                License::Custom(text) => vec![text.clone()],
                License::Unknown if !package.licenses.is_empty() => package.licenses.clone(),
                License::Unknown => vec!["UNKNOWN".to_string()],
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoutbom_core::{PackageId, PackageMetadata, PurlType};
    use std::collections::HashSet;

    fn pkg(name: &str, purl_type: Option<PurlType>, licenses: Vec<&str>) -> Package {
        Package {
            id: PackageId(0),
            name: name.to_string(),
            version: "1.0.0".to_string(),
            purl_type,
            locations: vec!["lockfile".to_string()],
            plugins: HashSet::new(),
            metadata: Some(PackageMetadata::Npm { resolved: None }),
            source_code: None,
            layer_metadata: None,
            licenses: licenses.into_iter().map(String::from).collect(),
            exploitability_signals: vec![],
        }
    }

    /// Scenario E: remote wins, pre-licensed packages keep theirs, and an
    /// unmapped/not-found package falls back to UNKNOWN.
    #[test]
    fn scenario_e_license_fallback_precedence() {
        let mut inv = Inventory::new();
        let mut express = pkg("express", Some(PurlType::Npm), vec![]);
        express.id = inv.next_id();
        let mut fzf = pkg("fzf", None, vec![]);
        fzf.id = inv.next_id();
        let mut pre_licensed = pkg("pre-licensed", Some(PurlType::Npm), vec!["Apache-2.0"]);
        pre_licensed.id = inv.next_id();

        inv.packages = vec![express, fzf, pre_licensed];

        let enricher = LicenseEnricher::new(Arc::new(|pkg: &Package| -> anyhow::Result<Option<Vec<String>>> {
            match pkg.name.as_str() {
                "express" => Ok(Some(vec!["MIT".to_string()])),
                "pre-licensed" => Ok(None), // remote has nothing; extractor value wins
                _ => Ok(None),
            }
        }));

        enricher.enrich(&mut inv).unwrap();

        assert_eq!(inv.packages[0].licenses, vec!["MIT".to_string()]);
        // fzf has no purl_type (brew is ecosystemless here); the lookup
        // reports not-found for it and it falls back to UNKNOWN.
        assert_eq!(inv.packages[1].licenses, vec!["UNKNOWN".to_string()]);
        assert_eq!(inv.packages[2].licenses, vec!["Apache-2.0".to_string()]);
    }

    #[test]
    fn notfound_with_no_existing_license_becomes_unknown() {
        let mut inv = Inventory::new();
        let mut pkg = pkg("left-pad", Some(PurlType::Npm), vec![]);
        pkg.id = inv.next_id();
        inv.packages = vec![pkg];

        let enricher = LicenseEnricher::new(Arc::new(|_: &Package| -> anyhow::Result<Option<Vec<String>>> { Ok(None) }));
        enricher.enrich(&mut inv).unwrap();

        assert_eq!(inv.packages[0].licenses, vec!["UNKNOWN".to_string()]);
    }

    #[test]
    fn first_fatal_error_aborts_the_whole_enricher() {
        let mut inv = Inventory::new();
        let mut pkg = pkg("left-pad", Some(PurlType::Npm), vec![]);
        pkg.id = inv.next_id();
        inv.packages = vec![pkg];

        let enricher = LicenseEnricher::new(Arc::new(|_: &Package| -> anyhow::Result<Option<Vec<String>>> {
            anyhow::bail!("deps.dev unavailable")
        }));
        assert!(enricher.enrich(&mut inv).is_err());
    }
}
