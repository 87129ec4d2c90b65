//! API key storage.
//!
//! The key is kept as a plain string in a single file next to the settings,
//! readable only by the current user on Unix. There is exactly one key.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use shared::credentials::CredentialStore;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::config_dir;

const KEY_FILE: &str = "api_key";

/// Key persisted on disk; survives restarts.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::in_dir(config_dir())
    }
}

impl FileCredentialStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(KEY_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        // mode() only applies on creation; tighten a file left by an older run
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .with_context(|| format!("failed to restrict {}", self.path.display()))?;
        }

        file.write_all(key.as_bytes())
            .with_context(|| format!("failed to write {}", self.path.display()))?;

        tracing::info!(path = %self.path.display(), "API key saved");
        Ok(())
    }

    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let key = contents.trim();
                if key.is_empty() {
                    None
                } else {
                    Some(key.to_string())
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read API key");
                None
            }
        }
    }

    fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("API key removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to remove {}", self.path.display()))
            }
        }
    }
}

/// Key held in memory only; gone when the process exits.
#[derive(Default)]
pub struct MemoryCredentialStore {
    key: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Mutex::new(Some(key.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, key: &str) -> Result<()> {
        *self.key.lock() = Some(key.to_string());
        Ok(())
    }

    fn get(&self) -> Option<String> {
        self.key.lock().clone()
    }

    fn remove(&self) -> Result<()> {
        self.key.lock().take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(tmp.path());
        assert_eq!(store.get(), None);

        store.save("AIxyz123").unwrap();
        assert_eq!(store.get().as_deref(), Some("AIxyz123"));

        store.remove().unwrap();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_file_store_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(tmp.path());
        store.save("AIfirst").unwrap();
        store.save("AIsecond").unwrap();
        assert_eq!(store.get().as_deref(), Some("AIsecond"));
    }

    #[test]
    fn test_file_store_survives_new_instance() {
        let tmp = TempDir::new().unwrap();
        FileCredentialStore::in_dir(tmp.path()).save("AIpersist").unwrap();
        let reopened = FileCredentialStore::in_dir(tmp.path());
        assert_eq!(reopened.get().as_deref(), Some("AIpersist"));
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let tmp = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(tmp.path().join("never-created"));
        assert!(store.remove().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(tmp.path());
        store.save("AIsecret").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_loose_key_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new().unwrap();
        let store = FileCredentialStore::in_dir(tmp.path());
        fs::write(store.path(), "AIold-and-much-longer-key").unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.save("AIshort").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(store.get().as_deref(), Some("AIshort"));
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get(), None);
        store.save("AIxyz123").unwrap();
        assert_eq!(store.get().as_deref(), Some("AIxyz123"));
        store.remove().unwrap();
        assert_eq!(store.get(), None);
    }
}
