//! Cache directory resolution: explicit path, then the
//! `OSV_SCANNER_LOCAL_DB_CACHE_DIRECTORY` environment variable, then the
//! OS user cache directory, falling back to a temp directory if none of
//! those can be created.

use std::path::{Path, PathBuf};

pub const CACHE_DIR_ENV_VAR: &str = "OSV_SCANNER_LOCAL_DB_CACHE_DIRECTORY";

/// Resolve the base directory scoutbom's local databases live under,
/// creating it if necessary. `explicit` wins over everything else; then the
/// environment variable; then the OS cache directory. If directory creation
/// fails at any of those (e.g. a read-only home directory), falls back to a
/// subdirectory of the system temp directory, which is always writable.
pub fn resolve_cache_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        if ensure_dir(path) {
            return path.to_path_buf();
        }
        tracing::warn!(path = %path.display(), "could not create explicit cache directory, falling back");
    }

    if let Ok(from_env) = std::env::var(CACHE_DIR_ENV_VAR) {
        let path = PathBuf::from(from_env);
        if ensure_dir(&path) {
            return path;
        }
        tracing::warn!(
            path = %path.display(),
            "could not create cache directory from {CACHE_DIR_ENV_VAR}, falling back"
        );
    }

    if let Some(base) = dirs::cache_dir() {
        let path = base.join("scoutbom");
        if ensure_dir(&path) {
            return path;
        }
        tracing::warn!(path = %path.display(), "could not create OS cache directory, falling back to temp");
    }

    let fallback = std::env::temp_dir().join("scoutbom-cache");
    let _ = std::fs::create_dir_all(&fallback);
    fallback
}

/// A subdirectory of the resolved cache dir, e.g. the per-ecosystem OSV
/// database directory.
pub fn resolve_cache_subdir(explicit: Option<&Path>, name: &str) -> PathBuf {
    let base = resolve_cache_dir(explicit);
    let subdir = base.join(name);
    let _ = std::fs::create_dir_all(&subdir);
    subdir
}

fn ensure_dir(path: &Path) -> bool {
    std::fs::create_dir_all(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Guards tests that mutate process environment, since `cargo test` runs
    // tests in the same process concurrently by default.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn explicit_path_wins_over_everything() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("explicit");
        std::env::set_var(CACHE_DIR_ENV_VAR, "/should/not/be/used");

        let resolved = resolve_cache_dir(Some(&explicit));

        std::env::remove_var(CACHE_DIR_ENV_VAR);
        assert_eq!(resolved, explicit);
        assert!(explicit.is_dir());
    }

    #[test]
    fn env_var_wins_when_no_explicit_path() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let from_env = dir.path().join("from-env");
        std::env::set_var(CACHE_DIR_ENV_VAR, &from_env);

        let resolved = resolve_cache_dir(None);

        std::env::remove_var(CACHE_DIR_ENV_VAR);
        assert_eq!(resolved, from_env);
        assert!(from_env.is_dir());
    }

    #[test]
    fn subdir_is_created_under_resolved_base() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("base");
        std::env::remove_var(CACHE_DIR_ENV_VAR);

        let subdir = resolve_cache_subdir(Some(&explicit), "npm");

        assert_eq!(subdir, explicit.join("npm"));
        assert!(subdir.is_dir());
    }
}
