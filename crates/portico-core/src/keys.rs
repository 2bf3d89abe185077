use serde::{Deserialize, Serialize};

/// Keys under which individual settings are persisted.
///
/// The store is a flat string map, so every key must be stable across
/// releases. Connection keys (`BaseProtocol`/`BaseHost`/`BasePort`/`Token`)
/// are read by the request layer on every outgoing call; the remaining keys
/// hold UI preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    /// Bearer token for the authenticated session
    Token,
    /// Backend scheme ("http" or "https")
    BaseProtocol,
    /// Backend hostname or IP, without scheme or trailing slash
    BaseHost,
    /// Backend port, stored as entered
    BasePort,
    /// UI theme mode preference
    Theme,
}

impl SettingKey {
    /// The stable string form used in the settings file.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Token => "token",
            SettingKey::BaseProtocol => "base-protocol",
            SettingKey::BaseHost => "base-host",
            SettingKey::BasePort => "base-port",
            SettingKey::Theme => "theme",
        }
    }

    pub fn all() -> &'static [SettingKey] {
        &[
            SettingKey::Token,
            SettingKey::BaseProtocol,
            SettingKey::BaseHost,
            SettingKey::BasePort,
            SettingKey::Theme,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn key_strings_are_stable() {
        assert_eq!(SettingKey::Token.as_str(), "token");
        assert_eq!(SettingKey::BaseProtocol.as_str(), "base-protocol");
        assert_eq!(SettingKey::BaseHost.as_str(), "base-host");
        assert_eq!(SettingKey::BasePort.as_str(), "base-port");
        assert_eq!(SettingKey::Theme.as_str(), "theme");
    }

    #[test]
    fn key_strings_are_unique() {
        let strings: HashSet<&str> = SettingKey::all().iter().map(|k| k.as_str()).collect();
        assert_eq!(strings.len(), SettingKey::all().len());
    }
}
