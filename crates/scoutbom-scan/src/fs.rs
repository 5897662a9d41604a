//! Abstract filesystem so extractors and detectors never touch `std::fs`
//! directly, making them testable against in-memory fixtures and reusable
//! against non-OS sources (e.g. a container layer tarball) later.

use std::path::{Path, PathBuf};

/// A minimal read-only filesystem view rooted at some base path.
pub trait ScanFileSystem: Send + Sync {
    /// Whether a relative path exists under the root.
    fn exists(&self, relative: &Path) -> bool;

    /// Read a relative path's contents as bytes.
    fn read(&self, relative: &Path) -> std::io::Result<Vec<u8>>;

    /// Read a relative path's contents as a UTF-8 string.
    fn read_to_string(&self, relative: &Path) -> std::io::Result<String> {
        let bytes = self.read(relative)?;
        String::from_utf8(bytes).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// The absolute root this filesystem is rooted at, for diagnostics.
    fn root(&self) -> &Path;
}

/// `ScanFileSystem` backed by the real OS filesystem, rooted at `root`.
pub struct StdFileSystem {
    root: PathBuf,
}

impl StdFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ScanFileSystem for StdFileSystem {
    fn exists(&self, relative: &Path) -> bool {
        self.root.join(relative).exists()
    }

    fn read(&self, relative: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(relative))
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_filesystem_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();

        let fs = StdFileSystem::new(dir.path());
        assert!(fs.exists(Path::new("package.json")));
        assert!(!fs.exists(Path::new("missing.json")));
        assert_eq!(fs.read_to_string(Path::new("package.json")).unwrap(), "{}");
    }
}
