//! The scan pipeline: walk, extract, detect, enrich, dedup.

use crate::fs::ScanFileSystem;
use crate::index::PackageIndex;
use crate::plugin::{Detector, Enricher, Extractor};
use crate::walk::walk;
use scoutbom_core::Inventory;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Synchronous analogue of an async cancellation context: callers flip this
/// from another thread (e.g. on SIGINT) and the pipeline checks it between
/// files instead of awaiting a future.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("scan was cancelled")]
    Cancelled,
    #[error("extractor {plugin:?} failed on {path}: {source}")]
    Extractor {
        plugin: String,
        path: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("detector {plugin:?} failed on {path}: {source}")]
    DetectorFailed {
        plugin: String,
        path: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("enricher {plugin:?} failed: {source}")]
    Enricher {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Whether enrichers that attribute packages to a base container-image
    /// layer should then drop those packages from the final inventory.
    pub remove_base_image_packages: bool,
    /// Cap on concurrent lookups during bounded fan-out enrichment (license,
    /// vulnerability fetch).
    pub max_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            remove_base_image_packages: false,
            max_concurrency: crate::license::DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Run extraction, detection, and enrichment over everything under `root`,
/// in that order, then dedup `PackageVuln` findings.
///
/// `extractors`, `detectors`, and `enrichers` must already be in the run
/// order `scoutbom_core::PluginRegistry::resolve` produced — the pipeline
/// itself does not re-resolve dependencies, it only dispatches.
pub fn run(
    fs: &dyn ScanFileSystem,
    root: &Path,
    extractors: &[Box<dyn Extractor>],
    detectors: &[Box<dyn Detector>],
    enrichers: &[Box<dyn Enricher>],
    config: &PipelineConfig,
    cancel: &CancellationToken,
) -> Result<Inventory, PipelineError> {
    let mut inventory = Inventory::new();
    let files = walk(root);

    tracing::debug!(file_count = files.len(), "walk complete");

    // Pass 1: extraction. Every extractor sees every file before any
    // detector runs, so the package index built below reflects the whole
    // scan rather than a prefix of it.
    for relative_path in &files {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        for extractor in extractors {
            if extractor.wants_file(relative_path) {
                extractor
                    .extract(fs, relative_path, &mut inventory)
                    .map_err(|source| PipelineError::Extractor {
                        plugin: extractor.name().to_string(),
                        path: relative_path.display().to_string(),
                        source,
                    })?;
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    // Spec §4.9 step 3: build the package index once extraction is done, for
    // O(1) detector lookups.
    let index = PackageIndex::build(&inventory.packages);

    // Pass 2: detection.
    for relative_path in &files {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        for detector in detectors {
            if detector.wants_file(relative_path) {
                detector
                    .detect(fs, relative_path, &index, &mut inventory)
                    .map_err(|source| PipelineError::DetectorFailed {
                        plugin: detector.name().to_string(),
                        path: relative_path.display().to_string(),
                        source,
                    })?;
            }
        }
    }

    if cancel.is_cancelled() {
        return Err(PipelineError::Cancelled);
    }

    for enricher in enrichers {
        tracing::debug!(plugin = enricher.name(), "running enricher");
        enricher
            .enrich(&mut inventory)
            .map_err(|source| PipelineError::Enricher {
                plugin: enricher.name().to_string(),
                source,
            })?;
    }

    inventory.dedup_package_vulns();

    Ok(inventory)
}
