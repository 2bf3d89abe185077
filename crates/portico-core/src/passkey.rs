//! Passkey assertion signing.
//!
//! The platform credential source is abstracted behind [`Authenticator`] so
//! the login flow can be exercised with a fake. The production implementation
//! holds a per-device secret in the config directory and signs server
//! challenges with HMAC-SHA256, emitting a WebAuthn-shaped assertion whose
//! binary fields are all base64url.

use crate::api::{AssertionResponse, PasskeyAssertion, PasskeyAuthenticationOptions};
use crate::b64url;
use anyhow::{bail, Context, Result};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Relying-party label hashed into the authenticator data.
const RP_ID: &[u8] = b"portico";

/// Flags byte: user present + user verified.
const FLAGS_UP_UV: u8 = 0x05;

/// Source of signed passkey assertions.
pub trait Authenticator: Send + Sync {
    /// Produce a signed assertion for the server-issued options.
    ///
    /// Errors mean "no usable credential" — callers on the login path must
    /// swallow them and fall back to the manual form.
    fn get_assertion(&self, options: &PasskeyAuthenticationOptions) -> Result<PasskeyAssertion>;
}

/// Authenticator backed by a 32-byte device secret on disk.
///
/// The secret is created during passkey registration (in the authenticated
/// area); at login time an absent or malformed file simply means there is no
/// passkey on this device.
pub struct DeviceKeyAuthenticator {
    secret_path: PathBuf,
}

impl DeviceKeyAuthenticator {
    pub fn new(secret_path: PathBuf) -> Self {
        Self { secret_path }
    }

    fn load_secret(&self) -> Result<Vec<u8>> {
        let data = std::fs::read(&self.secret_path)
            .with_context(|| format!("no device key at {}", self.secret_path.display()))?;
        if data.len() != 32 {
            bail!("device key has wrong size ({} bytes)", data.len());
        }
        Ok(data)
    }
}

impl Authenticator for DeviceKeyAuthenticator {
    fn get_assertion(&self, options: &PasskeyAuthenticationOptions) -> Result<PasskeyAssertion> {
        let secret = self.load_secret()?;
        sign_assertion(&secret, options)
    }
}

/// Sign `options` with `secret`, producing the wire-ready assertion.
pub fn sign_assertion(
    secret: &[u8],
    options: &PasskeyAuthenticationOptions,
) -> Result<PasskeyAssertion> {
    // The challenge must be valid base64url; it is echoed back verbatim
    // inside clientDataJSON.
    b64url::decode(&options.challenge).context("challenge is not valid base64url")?;

    let credential_id = credential_id(secret);
    let id = b64url::encode(&credential_id);

    if let Some(allowed) = &options.allow_credentials {
        if !allowed.is_empty() && !allowed.iter().any(|c| c.id == id) {
            bail!("no credential matching the allow list");
        }
    }

    let client_data = serde_json::json!({
        "type": "webauthn.get",
        "challenge": options.challenge,
        "origin": "portico://device",
    });
    let client_data_json = serde_json::to_vec(&client_data)?;

    let authenticator_data = build_authenticator_data();

    // Signature input per WebAuthn: authenticatorData || SHA-256(clientDataJSON)
    let client_data_hash = Sha256::digest(&client_data_json);
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(&authenticator_data);
    mac.update(&client_data_hash);
    let signature = mac.finalize().into_bytes();

    Ok(PasskeyAssertion {
        id: id.clone(),
        raw_id: id,
        credential_type: "public-key".to_string(),
        response: AssertionResponse {
            authenticator_data: b64url::encode(&authenticator_data),
            client_data_json: b64url::encode(&client_data_json),
            signature: b64url::encode(&signature),
            user_handle: None,
        },
    })
}

/// Stable credential ID derived from the device secret.
fn credential_id(secret: &[u8]) -> Vec<u8> {
    Sha256::digest(secret).to_vec()
}

/// rpIdHash(32) || flags(1) || signCount(4 BE)
fn build_authenticator_data() -> Vec<u8> {
    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(&Sha256::digest(RP_ID));
    data.push(FLAGS_UP_UV);
    let counter = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    data.extend_from_slice(&counter.to_be_bytes());
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AllowedCredential;
    use std::io::Write;

    const SECRET: [u8; 32] = [7u8; 32];

    fn options_with_challenge(challenge: &str) -> PasskeyAuthenticationOptions {
        PasskeyAuthenticationOptions {
            challenge: challenge.to_string(),
            allow_credentials: None,
            user_verification: Some("preferred".to_string()),
        }
    }

    fn write_secret(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(bytes).expect("write secret");
        file
    }

    #[test]
    fn assertion_fields_are_base64url() {
        let options = options_with_challenge(&b64url::encode(b"challenge-bytes"));
        let assertion = sign_assertion(&SECRET, &options).unwrap();

        assert!(b64url::decode(&assertion.id).is_ok());
        assert!(b64url::decode(&assertion.raw_id).is_ok());
        assert!(b64url::decode(&assertion.response.authenticator_data).is_ok());
        assert!(b64url::decode(&assertion.response.client_data_json).is_ok());
        assert!(b64url::decode(&assertion.response.signature).is_ok());
        assert!(assertion.response.user_handle.is_none());
        assert_eq!(assertion.credential_type, "public-key");
    }

    #[test]
    fn client_data_echoes_the_challenge() {
        let challenge = b64url::encode(b"fresh-challenge");
        let assertion = sign_assertion(&SECRET, &options_with_challenge(&challenge)).unwrap();

        let client_data_bytes = b64url::decode(&assertion.response.client_data_json).unwrap();
        let client_data: serde_json::Value = serde_json::from_slice(&client_data_bytes).unwrap();
        assert_eq!(client_data["type"], "webauthn.get");
        assert_eq!(client_data["challenge"], challenge.as_str());
    }

    #[test]
    fn signature_covers_auth_data_and_client_data_hash() {
        let options = options_with_challenge(&b64url::encode(b"c"));
        let assertion = sign_assertion(&SECRET, &options).unwrap();

        let auth_data = b64url::decode(&assertion.response.authenticator_data).unwrap();
        let client_data = b64url::decode(&assertion.response.client_data_json).unwrap();
        let signature = b64url::decode(&assertion.response.signature).unwrap();

        let mut mac = HmacSha256::new_from_slice(&SECRET).unwrap();
        mac.update(&auth_data);
        mac.update(&Sha256::digest(&client_data));
        mac.verify_slice(&signature).expect("signature should verify");
    }

    #[test]
    fn authenticator_data_has_webauthn_layout() {
        let options = options_with_challenge(&b64url::encode(b"c"));
        let assertion = sign_assertion(&SECRET, &options).unwrap();
        let auth_data = b64url::decode(&assertion.response.authenticator_data).unwrap();

        assert_eq!(auth_data.len(), 37);
        assert_eq!(&auth_data[..32], Sha256::digest(RP_ID).as_slice());
        assert_eq!(auth_data[32], FLAGS_UP_UV);
    }

    #[test]
    fn invalid_challenge_is_rejected() {
        let options = options_with_challenge("not base64url!!");
        assert!(sign_assertion(&SECRET, &options).is_err());
    }

    #[test]
    fn allow_list_without_our_credential_is_rejected() {
        let mut options = options_with_challenge(&b64url::encode(b"c"));
        options.allow_credentials = Some(vec![AllowedCredential {
            id: b64url::encode(b"someone else"),
            credential_type: "public-key".to_string(),
            transports: None,
        }]);
        assert!(sign_assertion(&SECRET, &options).is_err());
    }

    #[test]
    fn allow_list_with_our_credential_is_accepted() {
        let our_id = b64url::encode(&credential_id(&SECRET));
        let mut options = options_with_challenge(&b64url::encode(b"c"));
        options.allow_credentials = Some(vec![AllowedCredential {
            id: our_id,
            credential_type: "public-key".to_string(),
            transports: Some(vec!["internal".to_string()]),
        }]);
        assert!(sign_assertion(&SECRET, &options).is_ok());
    }

    #[test]
    fn device_authenticator_reads_secret_from_disk() {
        let file = write_secret(&SECRET);
        let authenticator = DeviceKeyAuthenticator::new(file.path().to_path_buf());
        let options = options_with_challenge(&b64url::encode(b"c"));
        assert!(authenticator.get_assertion(&options).is_ok());
    }

    #[test]
    fn device_authenticator_fails_without_secret() {
        let dir = tempfile::tempdir().unwrap();
        let authenticator = DeviceKeyAuthenticator::new(dir.path().join("missing"));
        let options = options_with_challenge(&b64url::encode(b"c"));
        assert!(authenticator.get_assertion(&options).is_err());
    }

    #[test]
    fn device_authenticator_rejects_wrong_size_secret() {
        let file = write_secret(&[1u8; 16]);
        let authenticator = DeviceKeyAuthenticator::new(file.path().to_path_buf());
        let options = options_with_challenge(&b64url::encode(b"c"));
        assert!(authenticator.get_assertion(&options).is_err());
    }
}
