//! Wires the default plugin set to `scoutbom_scan::pipeline::run` and runs
//! the guided-remediation severity filter over the result. This is the
//! entire "external collaborator" surface: everything else lives in the
//! library crates.

use crate::cli::ScanArgs;
use crate::config::ScanConfig;
use anyhow::Result;
use regex::Regex;
use scoutbom_core::{HostPolicy, Plugin, SecretKind};
use scoutbom_osv::{Matcher, MatcherConfig};
use scoutbom_remediation::{is_remediation_candidate, RemediationConfig, RemediationVuln, Subgraph};
use scoutbom_scan::detectors::netscaler::NetScalerDetector;
use scoutbom_scan::detectors::secrets::SecretDetector;
use scoutbom_scan::enrichers::{BaseImageEnricher, ExpirationEnricher, LicenseEnricher, OsvMatchEnricher};
use scoutbom_scan::depsdev::DepsDevClient;
use scoutbom_scan::extractors::npm::NpmExtractor;
use scoutbom_scan::fs::StdFileSystem;
use scoutbom_scan::{CancellationToken, Detector, Enricher, Extractor, PipelineConfig};
use scoutbom_veles::{Engine, SimpleTokenDetector};

pub struct ScanOutcome {
    pub inventory: scoutbom_core::Inventory,
    pub remediation_candidates: usize,
}

pub fn run(args: &ScanArgs) -> Result<ScanOutcome> {
    let config = ScanConfig {
        cache_dir: args.cache_dir.clone(),
        offline: args.offline,
        allow_online_network: args.online_enrichment,
        severity_threshold: args.severity_threshold,
        remove_base_image_packages: args.remove_base_image_packages,
        ..ScanConfig::default()
    };

    let host = config.host_policy();
    let fs = StdFileSystem::new(&args.path);

    let extractors: Vec<Box<dyn Extractor>> = vec![Box::new(NpmExtractor)];
    let detectors: Vec<Box<dyn Detector>> = vec![
        Box::new(NetScalerDetector),
        Box::new(SecretDetector::new(secret_engine())),
    ];
    let enrichers = build_enrichers(&config, &host)?;

    let inventory = scoutbom_scan::run(
        &fs,
        &args.path,
        &extractors,
        &detectors,
        &enrichers,
        &PipelineConfig {
            remove_base_image_packages: config.remove_base_image_packages,
            max_concurrency: config.max_concurrency,
        },
        &CancellationToken::new(),
    )?;

    let remediation_candidates = count_remediation_candidates(&inventory, &config);

    Ok(ScanOutcome {
        inventory,
        remediation_candidates,
    })
}

/// Fixed run order: none of the shipped enrichers declare a
/// `required_plugins` edge, so the list order below is the whole ordering
/// contract. Each candidate is checked against the host policy individually
/// rather than through `scoutbom_core::PluginRegistry`, whose `register`
/// takes the plugin by value generic and so cannot hold a heterogeneous
/// `Vec<Box<dyn Enricher>>`.
fn build_enrichers(config: &ScanConfig, host: &HostPolicy) -> Result<Vec<Box<dyn Enricher>>> {
    let mut candidates: Vec<Box<dyn Enricher>> = vec![
        Box::new(BaseImageEnricher::new(config.remove_base_image_packages)),
        Box::new(OsvMatchEnricher::new(Matcher::new(MatcherConfig {
            cache_dir: config.cache_dir.clone(),
            offline: config.offline,
            ..MatcherConfig::default()
        }))),
    ];
    if config.allow_online_network {
        candidates.push(Box::new(LicenseEnricher::new(std::sync::Arc::new(DepsDevClient::new()))));
        candidates.push(Box::new(ExpirationEnricher::heroku()));
        candidates.push(Box::new(ExpirationEnricher::ibm_cloud()));
    }

    Ok(candidates
        .into_iter()
        .filter(|enricher| {
            let ok = host.satisfies(&enricher.requirements());
            if !ok {
                tracing::warn!(plugin = enricher.name(), "enricher rejected by host policy, skipping");
            }
            ok
        })
        .collect())
}

fn secret_engine() -> Engine {
    Engine::new().with_token_detector(SimpleTokenDetector {
        name: "heroku-api-key",
        max_len: 64,
        re: Regex::new(r"\b[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\b").unwrap(),
        from_match: |m| {
            Some(scoutbom_core::Secret::new(
                "",
                SecretKind::HerokuApiKey {
                    key: String::from_utf8_lossy(m).to_string(),
                },
            ))
        },
    })
}

/// `Inventory::package_vulns` only carries `VulnerabilityRef` — id, aliases,
/// withdrawn, summary — not the affected ranges and severity the
/// remediation filter needs (`scoutbom_core::inventory` keeps that full
/// record owned by `scoutbom-osv` on purpose). So this asks a fresh
/// `Matcher` for the full `Vulnerability` records directly rather than
/// trying to reconstruct them from what the enricher already discarded.
/// The on-disk zipped db the earlier enrichment pass fetched is still
/// there, so this second query never re-hits the network even offline.
fn count_remediation_candidates(inventory: &scoutbom_core::Inventory, config: &ScanConfig) -> usize {
    let remediation_cfg = RemediationConfig {
        severity_threshold: config.severity_threshold,
        ..RemediationConfig::default()
    };
    let mut matcher = Matcher::new(MatcherConfig {
        cache_dir: config.cache_dir.clone(),
        offline: config.offline,
        ..MatcherConfig::default()
    });

    inventory
        .packages
        .iter()
        .flat_map(|package| {
            matcher
                .vulnerabilities_for(package)
                .into_iter()
                .map(move |vulnerability| {
                    let finding = RemediationVuln {
                        vulnerability,
                        dev_only: false,
                        subgraphs: vec![Subgraph::root()],
                    };
                    is_remediation_candidate(&finding, package, &remediation_cfg)
                })
        })
        .filter(|&is_candidate| is_candidate)
        .count()
}
