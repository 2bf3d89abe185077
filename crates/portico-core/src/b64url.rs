//! Base64url codec for credential material.
//!
//! Passkey payloads (challenges, credential IDs, assertion fields) cross the
//! trust boundary as base64url strings: URL-safe alphabet, no padding. Every
//! binary field goes through this one codec so the wire format stays uniform.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Encode bytes as a base64url string (no padding).
pub fn encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a base64url string (no padding) into bytes.
///
/// Padded or standard-alphabet input is rejected.
pub fn decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let samples: &[&[u8]] = &[b"", b"f", b"fo", b"foo", b"foob", b"fooba", b"foobar"];
        for sample in samples {
            let encoded = encode(sample);
            assert_eq!(decode(&encoded).unwrap(), sample.to_vec());
        }
    }

    #[test]
    fn uses_url_safe_alphabet() {
        // 0xfb 0xff encodes to "+/" in standard base64, "-_" in base64url
        let encoded = encode(&[0xfb, 0xef, 0xff]);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
        assert_eq!(encoded, "--__");
    }

    #[test]
    fn rejects_padded_input() {
        assert!(decode("AA==").is_err());
    }

    #[test]
    fn rejects_standard_alphabet() {
        assert!(decode("+/+/").is_err());
    }

    #[test]
    fn known_vector() {
        assert_eq!(encode(b"hello"), "aGVsbG8");
        assert_eq!(decode("aGVsbG8").unwrap(), b"hello");
    }
}
