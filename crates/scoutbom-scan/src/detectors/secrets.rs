//! Secret detector: wraps a `scoutbom_veles::Engine` so its simple-token and
//! pair detectors run as one `Detector` plugin over every regular file in
//! the scan, matching the per-file dispatch contract every other detector
//! uses (spec §4.4).

use crate::fs::ScanFileSystem;
use crate::index::PackageIndex;
use crate::plugin::Detector;
use scoutbom_core::{Capabilities, Inventory, Network, Plugin};
use scoutbom_veles::Engine;
use std::path::Path;

/// Files above this size are skipped rather than fully buffered; secret
/// scanning is line/byte-window oriented and gains nothing from huge
/// binaries or vendored archives.
const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

pub struct SecretDetector {
    engine: Engine,
}

impl SecretDetector {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

impl Plugin for SecretDetector {
    fn name(&self) -> &str {
        "veles-secret-detector"
    }

    fn version(&self) -> i32 {
        1
    }

    fn requirements(&self) -> Capabilities {
        Capabilities {
            network: Network::NotRequired,
            ..Capabilities::default()
        }
    }
}

impl Detector for SecretDetector {
    fn wants_file(&self, _relative_path: &Path) -> bool {
        true
    }

    fn detect(
        &self,
        fs: &dyn ScanFileSystem,
        relative_path: &Path,
        _index: &PackageIndex,
        inventory: &mut Inventory,
    ) -> anyhow::Result<()> {
        let bytes = match fs.read(relative_path) {
            Ok(b) if (b.len() as u64) <= MAX_FILE_BYTES => b,
            Ok(_) => {
                tracing::debug!(path = %relative_path.display(), "skipping oversized file for secret scan");
                return Ok(());
            }
            Err(err) => {
                tracing::warn!(path = %relative_path.display(), error = %err, "skipping unreadable file");
                return Ok(());
            }
        };

        for secret in self.engine.scan(&relative_path.display().to_string(), &bytes) {
            inventory.add_secret(secret);
        }
        Ok(())
    }
}
