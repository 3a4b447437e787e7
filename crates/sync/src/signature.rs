//! Webhook signature verification.
//!
//! Both platforms sign the raw request body with HMAC-SHA256 over the shared
//! secret, but encode the digest differently: Airtable sends lowercase hex in
//! `X-Airtable-Signature`, WooCommerce sends base64 in
//! `X-WC-Webhook-Signature`. When no secret is configured, verification is
//! skipped and every request is accepted.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Signature verification failures.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("Missing signature header")]
    Missing,
    #[error("Signature mismatch")]
    Mismatch,
    #[error("Invalid signing key")]
    InvalidKey,
}

fn digest(secret: &SecretString, body: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(body);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify an Airtable webhook signature (hex-encoded digest).
///
/// # Errors
///
/// Returns an error if the header is absent or does not match the body.
pub fn verify_airtable_signature(
    secret: Option<&SecretString>,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let signature = signature.ok_or(SignatureError::Missing)?;
    let expected = hex::encode(digest(secret, body)?);

    if constant_time_compare(&expected, signature.trim()) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Verify a WooCommerce webhook signature (base64-encoded digest).
///
/// # Errors
///
/// Returns an error if the header is absent or does not match the body.
pub fn verify_woo_signature(
    secret: Option<&SecretString>,
    body: &[u8],
    signature: Option<&str>,
) -> Result<(), SignatureError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let signature = signature.ok_or(SignatureError::Missing)?;
    let expected = BASE64.encode(digest(secret, body)?);

    if constant_time_compare(&expected, signature.trim()) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("whsec_test_0123456789")
    }

    fn sign_hex(body: &[u8]) -> String {
        hex::encode(digest(&secret(), body).unwrap())
    }

    fn sign_base64(body: &[u8]) -> String {
        BASE64.encode(digest(&secret(), body).unwrap())
    }

    #[test]
    fn test_airtable_valid_signature() {
        let body = br#"{"base":{"id":"appX"}}"#;
        let sig = sign_hex(body);
        assert!(verify_airtable_signature(Some(&secret()), body, Some(&sig)).is_ok());
    }

    #[test]
    fn test_airtable_tampered_body() {
        let sig = sign_hex(br#"{"a":1}"#);
        let result = verify_airtable_signature(Some(&secret()), br#"{"a":2}"#, Some(&sig));
        assert!(matches!(result, Err(SignatureError::Mismatch)));
    }

    #[test]
    fn test_airtable_missing_header() {
        let result = verify_airtable_signature(Some(&secret()), b"{}", None);
        assert!(matches!(result, Err(SignatureError::Missing)));
    }

    #[test]
    fn test_no_secret_skips_verification() {
        assert!(verify_airtable_signature(None, b"{}", None).is_ok());
        assert!(verify_woo_signature(None, b"{}", Some("garbage")).is_ok());
    }

    #[test]
    fn test_woo_valid_signature() {
        let body = br#"{"id":42}"#;
        let sig = sign_base64(body);
        assert!(verify_woo_signature(Some(&secret()), body, Some(&sig)).is_ok());
    }

    #[test]
    fn test_woo_rejects_hex_encoding() {
        // The right digest in the wrong encoding must not pass
        let body = br#"{"id":42}"#;
        let sig = sign_hex(body);
        assert!(verify_woo_signature(Some(&secret()), body, Some(&sig)).is_err());
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
