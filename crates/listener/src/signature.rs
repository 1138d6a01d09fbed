//! Webhook signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a GitHub webhook delivery using HMAC-SHA256.
///
/// `header` is the full `X-Hub-Signature-256` value, `sha256=<hex digest>`.
/// Comparison is constant-time to prevent timing attacks.
#[must_use]
pub fn verify_signature(body: &[u8], header: &str, secret: &str) -> bool {
    let Some(hex_signature) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(signature) = hex::decode(hex_signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    let computed = mac.finalize().into_bytes();
    computed.as_slice().ct_eq(&signature).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("mac");
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"action": "created"}"#;
        let header = sign(body, "s3cret");
        assert!(verify_signature(body, &header, "s3cret"));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = br#"{"action": "created"}"#;
        let header = sign(body, "s3cret");
        assert!(!verify_signature(body, &header, "other"));
    }

    #[test]
    fn tampered_body_fails() {
        let header = sign(br#"{"action": "created"}"#, "s3cret");
        assert!(!verify_signature(br#"{"action": "deleted"}"#, &header, "s3cret"));
    }

    #[test]
    fn missing_prefix_or_bad_hex_fails() {
        let body = b"x";
        assert!(!verify_signature(body, "deadbeef", "s3cret"));
        assert!(!verify_signature(body, "sha256=zz", "s3cret"));
    }
}
