//! The local OSV matcher entry point: resolves a cache directory, holds one
//! `ZippedDb` per ecosystem queried so far, and answers "what affects this
//! package" queries by combining `zipdb` loading with `affected::is_affected`.

use crate::vuln::Vulnerability;
use crate::zipdb::ZippedDb;
use scoutbom_core::Package;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_ARCHIVE_HOST: &str = "https://osv-vulnerabilities.storage.googleapis.com";

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub cache_dir: Option<PathBuf>,
    pub archive_host: String,
    pub user_agent: Option<String>,
    pub offline: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            archive_host: DEFAULT_ARCHIVE_HOST.to_string(),
            user_agent: Some(format!("scoutbom/{}", scoutbom_core::VERSION)),
            offline: false,
        }
    }
}

/// Given a package, the matcher needs to know which advisory ids are
/// acceptable to skip re-fetching — none here, since one matcher instance
/// always loads a fresh (or cache-validated) db per ecosystem on first use.
pub struct Matcher {
    config: MatcherConfig,
    base_path: PathBuf,
    dbs: HashMap<String, Option<ZippedDb>>,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        let base_path = scoutbom_cache::resolve_cache_subdir(config.cache_dir.as_deref(), "osv-scanner");
        Self {
            config,
            base_path,
            dbs: HashMap::new(),
        }
    }

    fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get (constructing and loading on first use) the db for `ecosystem`.
    /// A construction/load failure is cached as `None` so later queries in
    /// the same scan don't retry a known-bad ecosystem.
    fn db_for(&mut self, ecosystem: &str) -> Option<&ZippedDb> {
        if !self.dbs.contains_key(ecosystem) {
            let mut db = ZippedDb::new(
                self.base_path(),
                ecosystem,
                &self.config.archive_host,
                self.config.user_agent.clone(),
                self.config.offline,
                &[],
            );
            let result = db.fetch_and_load(&[]);
            match result {
                Ok(()) => {
                    self.dbs.insert(ecosystem.to_string(), Some(db));
                }
                Err(err) => {
                    tracing::warn!(ecosystem, %err, "failed to load osv database; will not retry this scan");
                    self.dbs.insert(ecosystem.to_string(), None);
                }
            }
        }
        self.dbs.get(ecosystem).and_then(|o| o.as_ref())
    }

    /// Spec §4.5: vulnerabilities affecting `package`, deduped by OSV id,
    /// excluding withdrawn advisories. Packages with no ecosystem (and no
    /// queryable source-code commit) produce an empty result rather than an
    /// error.
    pub fn vulnerabilities_for(&mut self, package: &Package) -> Vec<Vulnerability> {
        let Some(ecosystem) = package.ecosystem() else {
            return Vec::new();
        };
        if package.version.is_empty() && package.source_code.is_some() {
            // Ecosystemless, commit-known, version-unknown: not queryable.
            return Vec::new();
        }

        let Some(db) = self.db_for(ecosystem) else {
            return Vec::new();
        };

        let mut seen = std::collections::HashSet::new();
        db.vulnerabilities
            .iter()
            .filter(|v| !v.is_withdrawn())
            .filter(|v| crate::affected::is_affected(v, package))
            .filter(|v| seen.insert(v.id.clone()))
            .cloned()
            .collect()
    }
}
