//! Scan configuration. A plain, `serde`-deserializable struct rather than
//! hidden global state, so the same config can come from CLI flags, a
//! config file, or a test fixture.

use std::path::PathBuf;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScanConfig {
    /// Overrides the cache directory otherwise resolved by
    /// `scoutbom_cache::dir::resolve_cache_dir`.
    pub cache_dir: Option<PathBuf>,
    /// Disallows network access entirely; the OSV matcher then only ever
    /// reads its local cache.
    pub offline: bool,
    /// Allows `Network::Online` plugins (license lookup, expiration
    /// checks) to run. Independent of `offline`, which only gates the OSV
    /// matcher's own fetch.
    pub allow_online_network: bool,
    /// Minimum CVSS score a vulnerability finding must meet to be reported.
    pub severity_threshold: f64,
    pub remove_base_image_packages: bool,
    pub max_concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            offline: false,
            allow_online_network: false,
            severity_threshold: 0.0,
            remove_base_image_packages: false,
            max_concurrency: scoutbom_scan::license::DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl ScanConfig {
    /// `Network::Offline` plugins (e.g. the OSV matcher) always satisfy the
    /// host policy — they already degrade to cache-only per `self.offline`
    /// internally. Only `Network::Online` plugins are gated here.
    pub fn host_policy(&self) -> scoutbom_core::HostPolicy {
        scoutbom_core::HostPolicy {
            allow_offline_network: true,
            allow_online_network: self.allow_online_network,
            ..scoutbom_core::HostPolicy::current()
        }
    }
}
