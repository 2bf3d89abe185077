//! Typed calls for the backend endpoints the panel client uses.

use crate::api::{
    LoginRequest, PanelStatus, PasskeyAssertion, PasskeyAuthenticationOptions, PasskeyVerifyData,
};
use crate::client::request::{ApiClient, ApiError, HttpBudget};

impl ApiClient {
    /// POST {base}/login — exchange the shared token for a session token.
    pub async fn login_with_token(&self, token: &str) -> Result<String, ApiError> {
        let body = LoginRequest {
            token: token.to_string(),
        };
        self.post_json("/login", &body, HttpBudget::General).await
    }

    /// GET {base}/passkey/authenticate/options — fetch a fresh challenge and
    /// the credential descriptors the server will accept. Runs on the short
    /// budget: this is a probe, not a user-visible operation.
    pub async fn passkey_authentication_options(
        &self,
    ) -> Result<PasskeyAuthenticationOptions, ApiError> {
        self.get_json("/passkey/authenticate/options", HttpBudget::Control)
            .await
    }

    /// POST {base}/passkey/authenticate/verify — submit a signed assertion,
    /// returning the issued session token.
    pub async fn verify_passkey_authentication(
        &self,
        assertion: &PasskeyAssertion,
    ) -> Result<String, ApiError> {
        let data: PasskeyVerifyData = self
            .post_json("/passkey/authenticate/verify", assertion, HttpBudget::General)
            .await?;
        Ok(data.credential)
    }

    /// GET {base}/status — backend identity shown on the dashboard.
    pub async fn panel_status(&self) -> Result<PanelStatus, ApiError> {
        self.get_json("/status", HttpBudget::Control).await
    }

    /// GET {base}/log/export — the backend log as a raw octet stream.
    pub async fn export_log(&self) -> Result<Vec<u8>, ApiError> {
        self.get_bytes("/log/export").await
    }
}
