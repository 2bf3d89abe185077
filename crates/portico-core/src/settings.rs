//! Typed access to the persisted connection settings.
//!
//! Settings are stored as loose strings under [`SettingKey`] entries. The
//! store itself is behind the [`SettingsRepo`] trait so the request layer and
//! views can be tested against an in-memory map instead of a real file.

use crate::keys::SettingKey;
use std::collections::HashMap;
use std::sync::Mutex;

/// Abstract per-key settings store.
///
/// Implementations must tolerate concurrent access; values are opaque strings
/// and absence is meaningful ("not configured").
pub trait SettingsRepo: Send + Sync {
    fn get(&self, key: SettingKey) -> Option<String>;
    fn set(&self, key: SettingKey, value: &str);
    fn remove(&self, key: SettingKey);
}

/// In-memory settings store for tests and throwaway sessions.
pub struct MemorySettingsRepo {
    values: Mutex<HashMap<SettingKey, String>>,
}

impl MemorySettingsRepo {
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemorySettingsRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRepo for MemorySettingsRepo {
    fn get(&self, key: SettingKey) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned()
    }

    fn set(&self, key: SettingKey, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, value.to_string());
    }

    fn remove(&self, key: SettingKey) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key);
    }
}

/// Backend scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    /// Parse a stored scheme string; anything unrecognized falls back to http.
    pub fn parse(s: &str) -> Protocol {
        match s.trim() {
            "https" => Protocol::Https,
            _ => Protocol::Http,
        }
    }
}

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: &str = "6099";

/// The full connection tuple, read atomically from the store.
///
/// Invariant: `host` carries no scheme prefix and no trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub protocol: Protocol,
    pub host: String,
    pub port: String,
    pub token: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            token: None,
        }
    }
}

impl ConnectionSettings {
    /// Load the connection tuple in one pass, applying defaults for missing
    /// or blank values and migrating legacy hosts that were stored with a
    /// scheme prefix.
    pub fn load(repo: &dyn SettingsRepo) -> Self {
        let protocol = repo
            .get(SettingKey::BaseProtocol)
            .map(|v| Protocol::parse(&v))
            .unwrap_or_default();

        let mut host = repo
            .get(SettingKey::BaseHost)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        if let Some(migrated) = strip_scheme_prefix(&host) {
            log::info!("Migrating stored host '{}' to '{}'", host, migrated);
            host = migrated;
            repo.set(SettingKey::BaseHost, &host);
        }

        let port = repo
            .get(SettingKey::BasePort)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_PORT.to_string());

        let token = repo
            .get(SettingKey::Token)
            .filter(|v| !v.trim().is_empty());

        Self {
            protocol,
            host,
            port,
            token,
        }
    }

    /// Persist the endpoint triple (protocol/host/port).
    pub fn save_endpoint(repo: &dyn SettingsRepo, protocol: Protocol, host: &str, port: &str) {
        repo.set(SettingKey::BaseProtocol, protocol.as_str());
        repo.set(SettingKey::BaseHost, host.trim());
        repo.set(SettingKey::BasePort, port.trim());
    }

    /// Persist a freshly issued session token.
    pub fn store_token(repo: &dyn SettingsRepo, token: &str) {
        repo.set(SettingKey::Token, token);
    }

    /// Drop the session token (logout / unauthorized).
    pub fn clear_token(repo: &dyn SettingsRepo) {
        repo.remove(SettingKey::Token);
    }
}

/// Strip a legacy `http://`/`https://` prefix from a stored host.
/// Returns `Some(clean)` only when a migration is needed.
fn strip_scheme_prefix(host: &str) -> Option<String> {
    let stripped = host
        .strip_prefix("http://")
        .or_else(|| host.strip_prefix("https://"))?;
    if stripped.is_empty() {
        Some(DEFAULT_HOST.to_string())
    } else {
        Some(stripped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_defaults_from_empty_store() {
        let repo = MemorySettingsRepo::new();
        let settings = ConnectionSettings::load(&repo);
        assert_eq!(settings, ConnectionSettings::default());
    }

    #[test]
    fn load_reads_stored_values() {
        let repo = MemorySettingsRepo::new();
        ConnectionSettings::save_endpoint(&repo, Protocol::Https, "panel.local", "8443");
        ConnectionSettings::store_token(&repo, "tok-1");

        let settings = ConnectionSettings::load(&repo);
        assert_eq!(settings.protocol, Protocol::Https);
        assert_eq!(settings.host, "panel.local");
        assert_eq!(settings.port, "8443");
        assert_eq!(settings.token.as_deref(), Some("tok-1"));
    }

    #[test]
    fn load_migrates_host_with_scheme_prefix() {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::BaseHost, "http://127.0.0.1");

        let settings = ConnectionSettings::load(&repo);
        assert_eq!(settings.host, "127.0.0.1");
        // The cleaned value is written back
        assert_eq!(repo.get(SettingKey::BaseHost).as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn load_migrates_https_prefix() {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::BaseHost, "https://panel.example.com");
        let settings = ConnectionSettings::load(&repo);
        assert_eq!(settings.host, "panel.example.com");
    }

    #[test]
    fn bare_scheme_prefix_migrates_to_default_host() {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::BaseHost, "http://");
        let settings = ConnectionSettings::load(&repo);
        assert_eq!(settings.host, DEFAULT_HOST);
    }

    #[test]
    fn blank_token_reads_as_none() {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::Token, "   ");
        let settings = ConnectionSettings::load(&repo);
        assert!(settings.token.is_none());
    }

    #[test]
    fn clear_token_removes_the_key() {
        let repo = MemorySettingsRepo::new();
        ConnectionSettings::store_token(&repo, "tok");
        ConnectionSettings::clear_token(&repo);
        assert!(repo.get(SettingKey::Token).is_none());
    }

    #[test]
    fn unknown_protocol_falls_back_to_http() {
        assert_eq!(Protocol::parse("gopher"), Protocol::Http);
        assert_eq!(Protocol::parse("https"), Protocol::Https);
        assert_eq!(Protocol::parse(" https "), Protocol::Https);
    }
}
