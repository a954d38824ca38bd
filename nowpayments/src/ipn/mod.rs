//! Instant Payment Notification (IPN) authentication.
//!
//! - [`canonical`]: deterministic JSON serialization of notification bodies
//! - [`signing`]: HMAC-SHA512 signature generation and verification
//!
//! A delivery must only be accepted when verification returns `true`. A missing secret is an
//! [`Error::Configuration`], never a plain `false`, so a misconfigured receiver fails closed
//! instead of looking like it received a forged notification.

use std::fmt;

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::errors::{Error, Result};

pub mod canonical;
pub mod signing;

pub use canonical::{Canonicalization, canonicalize, canonicalize_with};
pub use signing::{SIGNATURE_HEADER, sign_payload, verify_signature, verify_signature_with};

/// Verifier bound to one IPN secret.
///
/// Holds no state besides the secret, so it can be cloned into request handlers and shared
/// across threads freely.
#[derive(Clone)]
pub struct IpnVerifier {
    secret: String,
    mode: Canonicalization,
}

impl IpnVerifier {
    /// Create a verifier. Fails if `secret` is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(Error::configuration("IPN secret key is not set"));
        }
        Ok(Self {
            secret,
            mode: Canonicalization::default(),
        })
    }

    /// Use a different canonical form (only needed for non-standard signers).
    pub fn with_canonicalization(mut self, mode: Canonicalization) -> Self {
        self.mode = mode;
        self
    }

    pub fn canonicalization(&self) -> Canonicalization {
        self.mode
    }

    /// Check `signature` against an already-parsed notification body.
    pub fn verify(&self, signature: &str, payload: &Value) -> bool {
        // The secret was checked non-empty on construction
        verify_signature_with(&self.secret, signature, payload, self.mode).unwrap_or(false)
    }

    /// Check `signature` against a raw body. Bodies that are not JSON never verify.
    pub fn verify_body(&self, signature: &str, body: &str) -> bool {
        match serde_json::from_str::<Value>(body) {
            Ok(payload) => self.verify(signature, &payload),
            Err(e) => {
                tracing::debug!(error = %e, "IPN body is not valid JSON");
                false
            }
        }
    }

    /// Check a delivery using the `x-nowpayments-sig` request header.
    pub fn verify_headers(&self, headers: &HeaderMap, body: &str) -> bool {
        let Some(signature) = headers.get(SIGNATURE_HEADER) else {
            tracing::debug!("IPN delivery missing {} header", SIGNATURE_HEADER);
            return false;
        };
        let Ok(signature) = signature.to_str() else {
            tracing::debug!("IPN signature header is not valid ASCII");
            return false;
        };
        self.verify_body(signature, body)
    }

    /// Signature the gateway would send for `payload`.
    pub fn sign(&self, payload: &Value) -> Option<String> {
        sign_payload(&self.secret, payload, self.mode)
    }
}

impl fmt::Debug for IpnVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpnVerifier")
            .field("secret", &"<redacted>")
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};
    use serde_json::json;

    fn verifier() -> IpnVerifier {
        IpnVerifier::new("abc123").unwrap()
    }

    #[test]
    fn test_new_rejects_empty_secret() {
        let err = IpnVerifier::new("").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_sign_and_verify() {
        let verifier = verifier();
        let payload = json!({"payment_id": 42, "payment_status": "finished", "actually_paid": 0.0035});
        let signature = verifier.sign(&payload).expect("should sign");

        assert!(verifier.verify(&signature, &payload));
        assert!(!verifier.verify(&signature, &json!({"payment_id": 42, "payment_status": "failed", "actually_paid": 0.0035})));

        let other = IpnVerifier::new("another-secret").unwrap();
        assert!(!other.verify(&signature, &payload));
    }

    #[test]
    fn test_verify_body() {
        let verifier = verifier();
        let body = r#"{"payment_status": "finished", "order_id": "x1"}"#;
        let signature = verifier.sign(&serde_json::from_str(body).unwrap()).unwrap();

        assert!(verifier.verify_body(&signature, body));
        assert!(!verifier.verify_body(&signature, "{not json"));
        assert!(!verifier.verify_body(&signature, ""));
    }

    #[test]
    fn test_verify_headers_case_insensitive() {
        let verifier = verifier();
        let body = r#"{"order_id":"x1","payment_status":"finished"}"#;
        let signature = verifier.sign(&serde_json::from_str(body).unwrap()).unwrap();

        let mut headers = HeaderMap::new();
        let name: HeaderName = "X-NOWPayments-Sig".parse().unwrap();
        headers.insert(name, HeaderValue::from_str(&signature).unwrap());

        assert!(verifier.verify_headers(&headers, body));
        assert!(!verifier.verify_headers(&headers, r#"{"order_id":"x2","payment_status":"finished"}"#));
    }

    #[test]
    fn test_verify_headers_missing_signature() {
        let verifier = verifier();
        assert!(!verifier.verify_headers(&HeaderMap::new(), r#"{"order_id":"x1"}"#));
    }

    #[test]
    fn test_verify_headers_non_ascii_value() {
        let verifier = verifier();
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_bytes(b"\xfa\xfb").unwrap());
        assert!(!verifier.verify_headers(&headers, "{}"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", verifier());
        assert!(!rendered.contains("abc123"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_verifier_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IpnVerifier>();
    }
}
