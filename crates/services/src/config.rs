//! Settings persisted as `settings.json` in the per-user config directory.

use anyhow::{Context, Result};
use shared::settings::AppSettings;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.json";

/// Per-user configuration directory (e.g. `~/.config/kisaanmitra` on Linux).
pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("com.local", "Kisaan Mitra", "KisaanMitra")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./config"))
}

pub struct SettingsStore {
    path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::in_dir(config_dir())
    }
}

impl SettingsStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(SETTINGS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved settings. The flag is `true` when defaults were used
    /// because nothing usable was on disk.
    pub fn load_or_default(&self) -> (AppSettings, bool) {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<AppSettings>(&bytes) {
                Ok(settings) => return (settings, false),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed settings");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read settings");
            }
        }
        (AppSettings::default(), true)
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(tmp.path());
        let (settings, fresh) = store.load_or_default();
        assert!(fresh);
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(tmp.path().join("nested"));
        let mut settings = AppSettings::default();
        settings.user_profile.dark_mode = true;
        settings.user_profile.language = "te".into();
        store.save(&settings).unwrap();

        let (loaded, fresh) = store.load_or_default();
        assert!(!fresh);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(tmp.path());
        fs::write(store.path(), "{not json").unwrap();
        let (settings, fresh) = store.load_or_default();
        assert!(fresh);
        assert_eq!(settings, AppSettings::default());
    }
}
