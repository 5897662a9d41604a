//! The three plugin specializations the scan pipeline dispatches to:
//! extractors turn a file into packages, detectors turn a file (or the
//! accumulated inventory) into vulnerability/secret findings, and enrichers
//! run once over the whole inventory after extraction and detection finish.

use crate::fs::ScanFileSystem;
use crate::index::PackageIndex;
use scoutbom_core::{Inventory, Plugin};
use std::path::Path;

/// Produces `Package` (and optionally `Secret`) records from a single file.
pub trait Extractor: Plugin {
    /// Fast check: should `extract` even be called for this path? Extractors
    /// are expected to look at the file name/extension only here, not its
    /// contents.
    fn wants_file(&self, relative_path: &Path) -> bool;

    fn extract(
        &self,
        fs: &dyn ScanFileSystem,
        relative_path: &Path,
        inventory: &mut Inventory,
    ) -> anyhow::Result<()>;
}

/// Produces findings (typically `PackageVuln` or `Secret`) from a single
/// file. Detectors declare `required_extractors` to guarantee that `index`
/// (built once, after every extractor has run) reflects a fully-populated
/// package set before any detector runs — used for signature-style matches
/// that don't need package metadata (e.g. a vulnerable-binary fingerprint)
/// as well as detectors that key findings to already-extracted packages.
pub trait Detector: Plugin {
    /// Names of extractors that must have already produced their packages
    /// before this detector's `index` argument can be trusted (spec §4.4).
    /// Most detectors here are self-contained signature matchers and need
    /// none.
    fn required_extractors(&self) -> &[&str] {
        &[]
    }

    fn wants_file(&self, relative_path: &Path) -> bool;

    fn detect(
        &self,
        fs: &dyn ScanFileSystem,
        relative_path: &Path,
        index: &PackageIndex,
        inventory: &mut Inventory,
    ) -> anyhow::Result<()>;
}

/// Runs once over the complete inventory after the walk finishes: license
/// lookup, vulnerability matching, expiration checks, and similar annotation
/// passes that need the whole picture rather than one file at a time.
pub trait Enricher: Plugin {
    fn enrich(&self, inventory: &mut Inventory) -> anyhow::Result<()>;
}
