//! File-backed settings store.
//!
//! Settings live as one flat string map in `settings.json` under the app
//! config directory. The map is loaded once at startup and written through on
//! every change. All typed access goes through
//! [`portico_core::settings::ConnectionSettings`].

use anyhow::{Context, Result};
use parking_lot::Mutex;
use portico_core::keys::SettingKey;
use portico_core::settings::SettingsRepo;
use std::collections::HashMap;
use std::path::PathBuf;

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("portico")
}

/// Get the settings file path
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Path of the passkey device secret (32 raw bytes).
pub fn device_key_path() -> PathBuf {
    config_dir().join("device_key")
}

/// Settings store persisted as a flat JSON string map.
pub struct FileSettingsRepo {
    path: PathBuf,
    values: Mutex<HashMap<String, String>>,
}

impl FileSettingsRepo {
    /// Load the store from `path`. A missing or malformed file starts empty;
    /// the old file is overwritten on the next write.
    pub fn load(path: PathBuf) -> Self {
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    log::warn!(
                        "Failed to parse settings file {}: {}, starting fresh",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                log::error!("Failed to read settings file {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Load from the default location.
    pub fn open_default() -> Self {
        Self::load(settings_path())
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600));
        }
        Ok(())
    }
}

impl SettingsRepo for FileSettingsRepo {
    fn get(&self, key: SettingKey) -> Option<String> {
        self.values.lock().get(key.as_str()).cloned()
    }

    fn set(&self, key: SettingKey, value: &str) {
        let mut values = self.values.lock();
        values.insert(key.as_str().to_string(), value.to_string());
        if let Err(e) = self.persist(&values) {
            log::error!("Failed to save settings: {}", e);
        }
    }

    fn remove(&self, key: SettingKey) {
        let mut values = self.values.lock();
        values.remove(key.as_str());
        if let Err(e) = self.persist(&values) {
            log::error!("Failed to save settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::settings::{ConnectionSettings, Protocol};

    fn temp_repo() -> (tempfile::TempDir, FileSettingsRepo) {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = FileSettingsRepo::load(dir.path().join("settings.json"));
        (dir, repo)
    }

    #[test]
    fn values_survive_reload() {
        let (dir, repo) = temp_repo();
        repo.set(SettingKey::BaseHost, "panel.local");
        repo.set(SettingKey::Token, "tok-1");
        drop(repo);

        let reloaded = FileSettingsRepo::load(dir.path().join("settings.json"));
        assert_eq!(
            reloaded.get(SettingKey::BaseHost).as_deref(),
            Some("panel.local")
        );
        assert_eq!(reloaded.get(SettingKey::Token).as_deref(), Some("tok-1"));
    }

    #[test]
    fn remove_survives_reload() {
        let (dir, repo) = temp_repo();
        repo.set(SettingKey::Token, "tok-1");
        repo.remove(SettingKey::Token);
        drop(repo);

        let reloaded = FileSettingsRepo::load(dir.path().join("settings.json"));
        assert!(reloaded.get(SettingKey::Token).is_none());
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let repo = FileSettingsRepo::load(path);
        assert!(repo.get(SettingKey::BaseHost).is_none());
    }

    #[test]
    fn missing_file_starts_empty() {
        let (_dir, repo) = temp_repo();
        assert!(repo.get(SettingKey::Token).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn settings_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, repo) = temp_repo();
        repo.set(SettingKey::Token, "secret");

        let mode = std::fs::metadata(dir.path().join("settings.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn works_as_connection_settings_backend() {
        let (_dir, repo) = temp_repo();
        ConnectionSettings::save_endpoint(&repo, Protocol::Https, "127.0.0.1", "8443");
        let settings = ConnectionSettings::load(&repo);
        assert_eq!(settings.protocol, Protocol::Https);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.port, "8443");
    }
}
