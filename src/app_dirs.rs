//! Filesystem locations for configuration and logs.
//!
//! Everything lives under one `.unbias-studio` folder in the OS config
//! directory. `UNBIAS_STUDIO_CONFIG_HOME` relocates it for portable setups;
//! tests use an in-process override so they never race on the environment.

use std::path::PathBuf;
use std::sync::Mutex;

use directories::BaseDirs;
use thiserror::Error;

/// Folder name under the OS config directory.
pub const APP_DIR_NAME: &str = ".unbias-studio";
const BASE_ENV_VAR: &str = "UNBIAS_STUDIO_CONFIG_HOME";

static BASE_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Errors raised while resolving or creating application directories.
#[derive(Debug, Error)]
pub enum AppDirError {
    /// No base config directory on this platform.
    #[error("No base directory available for application files")]
    NoBaseDir,
    /// A directory could not be created.
    #[error("Could not create {path}: {source}")]
    CreateDir {
        /// Directory that failed to create.
        path: PathBuf,
        /// Underlying io error.
        source: std::io::Error,
    },
}

/// The application's directories, created on resolution.
#[derive(Debug, Clone)]
pub struct AppDirs {
    /// Root folder holding the config file.
    pub root: PathBuf,
    /// Log files, nested under the root.
    pub logs: PathBuf,
}

/// Resolve the application directories, creating any that are missing.
pub fn resolve() -> Result<AppDirs, AppDirError> {
    let root = base_dir().ok_or(AppDirError::NoBaseDir)?.join(APP_DIR_NAME);
    let dirs = AppDirs {
        logs: root.join("logs"),
        root,
    };
    for dir in [&dirs.root, &dirs.logs] {
        std::fs::create_dir_all(dir).map_err(|source| AppDirError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(dirs)
}

fn base_dir() -> Option<PathBuf> {
    if let Some(path) = BASE_OVERRIDE.lock().ok().and_then(|guard| guard.clone()) {
        return Some(path);
    }
    if let Ok(path) = std::env::var(BASE_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Points directory resolution at a temp dir for the guard's lifetime.
#[cfg(test)]
pub(crate) struct ScopedBase;

#[cfg(test)]
impl ScopedBase {
    pub(crate) fn set(path: PathBuf) -> Self {
        *BASE_OVERRIDE.lock().expect("base override poisoned") = Some(path);
        Self
    }
}

#[cfg(test)]
impl Drop for ScopedBase {
    fn drop(&mut self) {
        if let Ok(mut guard) = BASE_OVERRIDE.lock() {
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolve_creates_root_and_logs() {
        let base = tempdir().unwrap();
        let _guard = ScopedBase::set(base.path().to_path_buf());
        let dirs = resolve().unwrap();
        assert_eq!(dirs.root, base.path().join(APP_DIR_NAME));
        assert_eq!(dirs.logs, dirs.root.join("logs"));
        assert!(dirs.root.is_dir());
        assert!(dirs.logs.is_dir());
    }
}
