//! License lookup cache and the bounded-concurrency fan-out used to resolve
//! licenses for every package found in a scan.

use std::collections::HashMap;
use std::sync::RwLock;

/// A resolved license, in whatever form the lookup produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum License {
    Spdx(String),
    Custom(String),
    Unknown,
}

impl License {
    pub fn as_spdx(&self) -> String {
        match self {
            Self::Spdx(id) => id.clone(),
            Self::Custom(text) => text.clone(),
            Self::Unknown => "NOASSERTION".to_string(),
        }
    }
}

/// Thread-safe cache so repeated lookups of the same `name@version` across a
/// scan (or across the bounded fan-out below) don't redo the file read.
#[derive(Debug, Default)]
pub struct LicenseCache {
    cache: RwLock<HashMap<String, License>>,
}

impl LicenseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<License> {
        self.cache.read().unwrap().get(key).cloned()
    }

    pub fn insert(&self, key: String, license: License) {
        self.cache.write().unwrap().insert(key, license);
    }

    pub fn get_or_insert_with<F>(&self, key: String, f: F) -> License
    where
        F: FnOnce() -> License,
    {
        if let Some(license) = self.get(&key) {
            return license;
        }
        let license = f();
        self.insert(key, license.clone());
        license
    }

    pub fn len(&self) -> usize {
        self.cache.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().unwrap().is_empty()
    }
}

/// Default bound on concurrent license lookups during enrichment.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1000;

/// Resolve `lookup` for every item in `items` using a rayon thread pool
/// capped at `max_concurrency`, returning results indexed by the item's
/// original position (not completion order), so callers can zip the result
/// back against the input slice.
pub fn resolve_bounded<T, F>(items: &[T], max_concurrency: usize, lookup: F) -> Vec<License>
where
    T: Sync,
    F: Fn(&T) -> License + Sync,
{
    if items.is_empty() {
        return Vec::new();
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_concurrency.max(1).min(items.len().max(1)))
        .build()
        .expect("thread pool config is always valid here");

    pool.install(|| {
        use rayon::prelude::*;
        items.par_iter().map(|item| lookup(item)).collect()
    })
}
