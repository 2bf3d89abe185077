use serde::{Deserialize, Serialize};

// ── Response envelope ───────────────────────────────────────────────────────

/// Every JSON response from the backend is wrapped in this envelope.
/// `code == 0` means success; anything else carries the failure in `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

/// The message the backend uses when a bearer token is missing or expired.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    pub fn is_unauthorized(&self) -> bool {
        !self.is_success() && self.message == UNAUTHORIZED_MESSAGE
    }
}

// ── Token login ─────────────────────────────────────────────────────────────

/// POST {base}/login request
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub token: String,
}

// ── Passkey authentication ──────────────────────────────────────────────────

/// GET {base}/passkey/authenticate/options response payload.
///
/// Field names follow the WebAuthn JSON convention (camelCase); binary
/// values are base64url strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyAuthenticationOptions {
    pub challenge: String,
    #[serde(rename = "allowCredentials", default)]
    pub allow_credentials: Option<Vec<AllowedCredential>>,
    #[serde(rename = "userVerification", default)]
    pub user_verification: Option<String>,
}

/// A credential descriptor the server will accept for this challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedCredential {
    /// base64url credential ID
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(default)]
    pub transports: Option<Vec<String>>,
}

/// POST {base}/passkey/authenticate/verify request body: a signed assertion
/// with all binary fields base64url-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyAssertion {
    pub id: String,
    #[serde(rename = "rawId")]
    pub raw_id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub response: AssertionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionResponse {
    #[serde(rename = "authenticatorData")]
    pub authenticator_data: String,
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub signature: String,
    /// Optional; serialized as null when absent, matching the wire contract.
    #[serde(rename = "userHandle")]
    pub user_handle: Option<String>,
}

/// POST {base}/passkey/authenticate/verify response payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasskeyVerifyData {
    #[serde(rename = "Credential")]
    pub credential: String,
}

// ── Panel status ────────────────────────────────────────────────────────────

/// GET {base}/status response payload, shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelStatus {
    pub name: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_round_trip() {
        let json = r#"{"code":0,"message":"","data":"session-token"}"#;
        let env: Envelope<String> = serde_json::from_str(json).unwrap();
        assert!(env.is_success());
        assert!(!env.is_unauthorized());
        assert_eq!(env.data.as_deref(), Some("session-token"));
    }

    #[test]
    fn envelope_error_without_data() {
        let json = r#"{"code":1,"message":"Unauthorized"}"#;
        let env: Envelope<String> = serde_json::from_str(json).unwrap();
        assert!(!env.is_success());
        assert!(env.is_unauthorized());
        assert!(env.data.is_none());
    }

    #[test]
    fn envelope_error_other_message_is_not_unauthorized() {
        let json = r#"{"code":7,"message":"token mismatch"}"#;
        let env: Envelope<String> = serde_json::from_str(json).unwrap();
        assert!(!env.is_unauthorized());
    }

    #[test]
    fn authentication_options_backwards_compatible() {
        // Minimal options without allowCredentials/userVerification
        let json = r#"{"challenge":"Y2hhbGxlbmdl"}"#;
        let options: PasskeyAuthenticationOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.challenge, "Y2hhbGxlbmdl");
        assert!(options.allow_credentials.is_none());
        assert!(options.user_verification.is_none());
    }

    #[test]
    fn authentication_options_full() {
        let json = r#"{
            "challenge": "Y2hhbGxlbmdl",
            "allowCredentials": [
                {"id": "Y3JlZA", "type": "public-key", "transports": ["internal"]}
            ],
            "userVerification": "preferred"
        }"#;
        let options: PasskeyAuthenticationOptions = serde_json::from_str(json).unwrap();
        let creds = options.allow_credentials.unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(creds[0].id, "Y3JlZA");
        assert_eq!(creds[0].credential_type, "public-key");
        assert_eq!(options.user_verification.as_deref(), Some("preferred"));
    }

    #[test]
    fn assertion_serializes_with_webauthn_field_names() {
        let assertion = PasskeyAssertion {
            id: "aWQ".into(),
            raw_id: "aWQ".into(),
            credential_type: "public-key".into(),
            response: AssertionResponse {
                authenticator_data: "YXV0aA".into(),
                client_data_json: "Y2xpZW50".into(),
                signature: "c2ln".into(),
                user_handle: None,
            },
        };
        let json = serde_json::to_string(&assertion).unwrap();
        assert!(json.contains("\"rawId\""));
        assert!(json.contains("\"type\":\"public-key\""));
        assert!(json.contains("\"authenticatorData\""));
        assert!(json.contains("\"clientDataJSON\""));
        assert!(json.contains("\"signature\""));
        // Absent userHandle is an explicit null, not omitted
        assert!(json.contains("\"userHandle\":null"));

        let parsed: PasskeyAssertion = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.response.signature, "c2ln");
    }

    #[test]
    fn verify_data_uses_capitalized_field() {
        let json = r#"{"Credential":"tok-1"}"#;
        let data: PasskeyVerifyData = serde_json::from_str(json).unwrap();
        assert_eq!(data.credential, "tok-1");
        assert!(serde_json::to_string(&data).unwrap().contains("\"Credential\""));
    }

    #[test]
    fn panel_status_round_trip() {
        let status = PanelStatus {
            name: "panel".into(),
            version: "1.2.3".into(),
            uptime_secs: 86400,
        };
        let json = serde_json::to_string(&status).unwrap();
        let parsed: PanelStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "1.2.3");
        assert_eq!(parsed.uptime_secs, 86400);
    }
}
