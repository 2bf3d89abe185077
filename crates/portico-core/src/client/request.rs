//! Request construction against the configured backend.
//!
//! The base URL is derived from the settings store on every call, so a
//! settings change takes effect without recreating the client. Responses are
//! `{code, message, data}` envelopes; a non-zero code is a failure, and an
//! `Unauthorized` failure while a token is stored logs the session out.

use crate::api::Envelope;
use crate::keys::SettingKey;
use crate::settings::{ConnectionSettings, SettingsRepo};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Budget for liveness/control calls (passkey probe, status).
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(5);
/// Budget for general calls (login, data fetches).
pub const GENERAL_TIMEOUT: Duration = Duration::from_secs(10);

/// Compute the API base URL from the stored protocol/host/port.
///
/// Returns `""` when host or port is missing or blank — "not configured",
/// which callers interpret as "prompt for login settings". Never fails;
/// malformed stored values degrade to the empty result.
pub fn base_url(repo: &dyn SettingsRepo) -> String {
    let host = match repo.get(SettingKey::BaseHost) {
        Some(h) if !h.trim().is_empty() => h.trim().to_string(),
        _ => return String::new(),
    };
    let port = match repo.get(SettingKey::BasePort) {
        Some(p) if !p.trim().is_empty() => p.trim().to_string(),
        _ => return String::new(),
    };
    let protocol = repo
        .get(SettingKey::BaseProtocol)
        .map(|v| crate::settings::Protocol::parse(&v))
        .unwrap_or_default();

    let host = host.trim_end_matches('/');
    format!("{}://{}:{}/api", protocol.as_str(), host, port)
}

/// Compute the WebSocket base URL: the API base with `http`→`ws` /
/// `https`→`wss`. Empty when the base URL is empty.
pub fn ws_base_url(repo: &dyn SettingsRepo) -> String {
    let base = base_url(repo);
    if base.is_empty() {
        return base;
    }
    if let Some(rest) = base.strip_prefix("https:") {
        format!("wss:{}", rest)
    } else if let Some(rest) = base.strip_prefix("http:") {
        format!("ws:{}", rest)
    } else {
        base
    }
}

/// Errors surfaced by [`ApiClient`] calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Host/port not configured yet — show the login settings form.
    #[error("backend address is not configured")]
    NotConfigured,
    /// Transport-level failure (connection refused, timeout, TLS, ...).
    #[error("network error: {0}")]
    Network(String),
    /// Non-success HTTP status outside the envelope contract.
    #[error("HTTP {0}")]
    Http(u16),
    /// The backend answered with a non-zero envelope code.
    #[error("{message}")]
    Backend { message: String },
    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for transport-level failures — the mixed-content heuristic keys
    /// off this, not off backend rejections.
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Session-level notifications emitted by the client outside the call
/// result, consumed by the UI event pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected the stored token; it has been cleared and the
    /// UI must drop back to the login screen.
    Unauthorized,
}

/// Which of the two client instances a call runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpBudget {
    /// 5 s — liveness and control calls
    Control,
    /// 10 s — general calls
    General,
}

/// HTTP client pair bound to the settings store.
pub struct ApiClient {
    general: reqwest::Client,
    control: reqwest::Client,
    repo: Arc<dyn SettingsRepo>,
    events: async_channel::Sender<SessionEvent>,
}

impl ApiClient {
    /// Build the client pair. The returned receiver carries session events
    /// (currently only [`SessionEvent::Unauthorized`]).
    pub fn new(
        repo: Arc<dyn SettingsRepo>,
    ) -> anyhow::Result<(Self, async_channel::Receiver<SessionEvent>)> {
        let general = reqwest::Client::builder().timeout(GENERAL_TIMEOUT).build()?;
        let control = reqwest::Client::builder().timeout(CONTROL_TIMEOUT).build()?;
        let (events, event_rx) = async_channel::bounded(16);
        Ok((
            Self {
                general,
                control,
                repo,
                events,
            },
            event_rx,
        ))
    }

    /// Snapshot of the current connection settings.
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings::load(self.repo.as_ref())
    }

    pub fn repo(&self) -> &Arc<dyn SettingsRepo> {
        &self.repo
    }

    fn http(&self, budget: HttpBudget) -> &reqwest::Client {
        match budget {
            HttpBudget::Control => &self.control,
            HttpBudget::General => &self.general,
        }
    }

    /// Resolve `path` against the live base URL.
    fn target(&self, path: &str) -> Result<String, ApiError> {
        let base = base_url(self.repo.as_ref());
        if base.is_empty() {
            return Err(ApiError::NotConfigured);
        }
        Ok(format!("{}{}", base, path))
    }

    /// Attach `Authorization: Bearer <token>` when a token is stored.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.repo.get(SettingKey::Token) {
            Some(token) if !token.trim().is_empty() => {
                request.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
            }
            _ => request,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        budget: HttpBudget,
    ) -> Result<T, ApiError> {
        let url = self.target(path)?;
        let response = self
            .authorize(self.http(budget).get(&url))
            .send()
            .await
            .map_err(transport_error)?;
        self.decode_envelope(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        budget: HttpBudget,
    ) -> Result<T, ApiError> {
        let url = self.target(path)?;
        let response = self
            .authorize(self.http(budget).post(&url))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;
        self.decode_envelope(response).await
    }

    /// Fetch a raw binary body. `application/octet-stream` responses pass
    /// through untouched; anything else is treated as an error envelope.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.target(path)?;
        let response = self
            .authorize(self.general.get(&url))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(ApiError::Http(response.status().as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if is_octet_stream(&content_type) {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            return Ok(bytes.to_vec());
        }

        // A JSON envelope where a download was expected: surface its failure.
        let envelope: Envelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        match self.unwrap_envelope(envelope) {
            Ok(_) => Err(ApiError::Decode("expected binary response".into())),
            Err(err) => Err(err),
        }
    }

    async fn decode_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::Http(response.status().as_u16()));
        }
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.unwrap_envelope(envelope)
    }

    /// Apply the envelope contract. An `Unauthorized` failure while a token
    /// is stored clears the token and notifies the session event channel;
    /// the same failure with no stored token is an ordinary backend error.
    fn unwrap_envelope<T>(&self, envelope: Envelope<T>) -> Result<T, ApiError> {
        if envelope.is_success() {
            return envelope
                .data
                .ok_or_else(|| ApiError::Decode("envelope is missing data".into()));
        }

        if envelope.is_unauthorized() && self.repo.get(SettingKey::Token).is_some() {
            log::warn!("Stored token rejected by backend, logging out");
            ConnectionSettings::clear_token(self.repo.as_ref());
            let _ = self.events.try_send(SessionEvent::Unauthorized);
        }

        Err(ApiError::Backend {
            message: envelope.message,
        })
    }
}

fn transport_error(err: reqwest::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn is_octet_stream(content_type: &str) -> bool {
    content_type.starts_with("application/octet-stream")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettingsRepo;

    fn repo_with(protocol: &str, host: &str, port: &str) -> MemorySettingsRepo {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::BaseProtocol, protocol);
        repo.set(SettingKey::BaseHost, host);
        repo.set(SettingKey::BasePort, port);
        repo
    }

    fn client(repo: MemorySettingsRepo) -> (ApiClient, async_channel::Receiver<SessionEvent>) {
        ApiClient::new(Arc::new(repo)).expect("client should build")
    }

    fn envelope<T>(code: i64, message: &str, data: Option<T>) -> Envelope<T> {
        Envelope {
            code,
            message: message.to_string(),
            data,
        }
    }

    #[test]
    fn base_url_composes_protocol_host_port() {
        let repo = repo_with("http", "localhost", "6099");
        assert_eq!(base_url(&repo), "http://localhost:6099/api");

        let repo = repo_with("https", "panel.example.com", "443");
        assert_eq!(base_url(&repo), "https://panel.example.com:443/api");
    }

    #[test]
    fn base_url_strips_trailing_slashes_from_host() {
        let repo = repo_with("http", "localhost/", "6099");
        assert_eq!(base_url(&repo), "http://localhost:6099/api");

        let repo = repo_with("http", "localhost///", "6099");
        assert_eq!(base_url(&repo), "http://localhost:6099/api");
    }

    #[test]
    fn base_url_empty_when_host_missing_or_blank() {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::BasePort, "6099");
        assert_eq!(base_url(&repo), "");

        let repo = repo_with("http", "   ", "6099");
        assert_eq!(base_url(&repo), "");
    }

    #[test]
    fn base_url_empty_when_port_missing_or_blank() {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::BaseHost, "localhost");
        assert_eq!(base_url(&repo), "");

        let repo = repo_with("http", "localhost", "");
        assert_eq!(base_url(&repo), "");
    }

    #[test]
    fn base_url_defaults_protocol_to_http() {
        let repo = MemorySettingsRepo::new();
        repo.set(SettingKey::BaseHost, "localhost");
        repo.set(SettingKey::BasePort, "6099");
        assert_eq!(base_url(&repo), "http://localhost:6099/api");
    }

    #[test]
    fn ws_base_url_maps_schemes() {
        let repo = repo_with("http", "localhost", "6099");
        assert_eq!(ws_base_url(&repo), "ws://localhost:6099/api");

        let repo = repo_with("https", "localhost", "6099");
        assert_eq!(ws_base_url(&repo), "wss://localhost:6099/api");
    }

    #[test]
    fn ws_base_url_empty_when_not_configured() {
        let repo = MemorySettingsRepo::new();
        assert_eq!(ws_base_url(&repo), "");
    }

    #[test]
    fn unwrap_envelope_returns_data_on_success() {
        let (client, _events) = client(repo_with("http", "localhost", "6099"));
        let result = client.unwrap_envelope(envelope(0, "", Some("tok".to_string())));
        assert_eq!(result.unwrap(), "tok");
    }

    #[test]
    fn unwrap_envelope_missing_data_is_decode_error() {
        let (client, _events) = client(repo_with("http", "localhost", "6099"));
        let result: Result<String, _> = client.unwrap_envelope(envelope(0, "", None));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn unwrap_envelope_surfaces_backend_message() {
        let (client, _events) = client(repo_with("http", "localhost", "6099"));
        let result: Result<String, _> =
            client.unwrap_envelope(envelope(3, "token mismatch", None));
        match result {
            Err(ApiError::Backend { message }) => assert_eq!(message, "token mismatch"),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn unauthorized_with_stored_token_clears_it_and_notifies() {
        let repo = repo_with("http", "localhost", "6099");
        repo.set(SettingKey::Token, "stale-token");
        let (client, events) = client(repo);

        let result: Result<String, _> =
            client.unwrap_envelope(envelope(1, "Unauthorized", None));
        assert!(matches!(result, Err(ApiError::Backend { .. })));

        assert!(client.repo().get(SettingKey::Token).is_none());
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Unauthorized);
    }

    #[test]
    fn unauthorized_without_stored_token_does_not_notify() {
        let (client, events) = client(repo_with("http", "localhost", "6099"));

        let result: Result<String, _> =
            client.unwrap_envelope(envelope(1, "Unauthorized", None));
        assert!(matches!(result, Err(ApiError::Backend { .. })));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn non_unauthorized_error_keeps_the_token() {
        let repo = repo_with("http", "localhost", "6099");
        repo.set(SettingKey::Token, "still-good");
        let (client, events) = client(repo);

        let result: Result<String, _> = client.unwrap_envelope(envelope(5, "busy", None));
        assert!(result.is_err());
        assert_eq!(
            client.repo().get(SettingKey::Token).as_deref(),
            Some("still-good")
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn target_requires_configuration() {
        let (client, _events) = client(MemorySettingsRepo::new());
        assert!(matches!(
            client.target("/login"),
            Err(ApiError::NotConfigured)
        ));
    }

    #[test]
    fn target_appends_path_to_base() {
        let (client, _events) = client(repo_with("http", "localhost", "6099"));
        assert_eq!(
            client.target("/login").unwrap(),
            "http://localhost:6099/api/login"
        );
    }

    #[test]
    fn octet_stream_detection() {
        assert!(is_octet_stream("application/octet-stream"));
        assert!(is_octet_stream("application/octet-stream; charset=binary"));
        assert!(!is_octet_stream("application/json"));
    }

    #[test]
    fn network_predicate_only_matches_transport_failures() {
        assert!(ApiError::Network("connection refused".into()).is_network());
        assert!(!ApiError::Http(502).is_network());
        assert!(!ApiError::Backend {
            message: "nope".into()
        }
        .is_network());
        assert!(!ApiError::NotConfigured.is_network());
    }
}
