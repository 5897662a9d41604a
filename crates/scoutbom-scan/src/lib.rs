//! The scan pipeline: an abstract filesystem, a deterministic walker, the
//! extractor/detector/enricher plugin contracts, and the orchestrator that
//! ties them together into an `Inventory`.

pub mod depsdev;
pub mod detectors;
pub mod enrichers;
pub mod extractors;
pub mod fs;
pub mod index;
pub mod license;
pub mod pipeline;
pub mod plugin;
pub mod walk;

pub use index::PackageIndex;
pub use pipeline::{run, CancellationToken, PipelineConfig, PipelineError};
pub use plugin::{Detector, Enricher, Extractor};
