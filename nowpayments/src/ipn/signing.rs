//! HMAC-SHA512 signing and verification of IPN payloads.
//!
//! The gateway signs every notification with the integrator's IPN secret:
//! - Signature is computed over the canonical JSON form of the body (see [`super::canonical`])
//! - The signature is lowercase hex-encoded HMAC-SHA512
//! - It is delivered in the `x-nowpayments-sig` header

use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha512;

use super::canonical::{Canonicalization, canonical_bytes};
use crate::errors::{Error, Result};

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the signature on inbound IPN deliveries
pub const SIGNATURE_HEADER: &str = "x-nowpayments-sig";

/// Sign a payload the way the gateway does.
///
/// # Returns
///
/// Lowercase hex HMAC-SHA512 of the canonical payload, or `None` if the payload could not be
/// canonicalized.
pub fn sign_payload(secret: &str, payload: &Value, mode: Canonicalization) -> Option<String> {
    let message = canonical_bytes(payload, mode).ok()?;

    let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(&message);

    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify an IPN signature against a payload.
///
/// # Arguments
///
/// * `secret` - The IPN secret configured in the gateway dashboard
/// * `claimed_signature` - The `x-nowpayments-sig` header value
/// * `payload` - The parsed notification body
///
/// # Returns
///
/// `Ok(true)` only if the claimed signature equals the expected lowercase hex digest exactly.
/// Every mismatch, including malformed signatures, is `Ok(false)`.
///
/// # Errors
///
/// [`Error::Configuration`] if `secret` is empty, since nothing can be verified without it.
pub fn verify_signature(secret: &str, claimed_signature: &str, payload: &Value) -> Result<bool> {
    verify_signature_with(secret, claimed_signature, payload, Canonicalization::default())
}

pub fn verify_signature_with(secret: &str, claimed_signature: &str, payload: &Value, mode: Canonicalization) -> Result<bool> {
    if secret.is_empty() {
        tracing::error!("IPN verification attempted without a configured secret");
        return Err(Error::configuration("IPN secret key is not set"));
    }

    let Some(expected) = sign_payload(secret, payload, mode) else {
        tracing::debug!("IPN payload could not be canonicalized");
        return Ok(false);
    };

    let valid = constant_time_eq(expected.as_bytes(), claimed_signature.as_bytes());
    if !valid {
        tracing::debug!(signature_len = claimed_signature.len(), "IPN signature does not match");
    }
    Ok(valid)
}

/// Constant-time byte comparison to prevent timing attacks.
///
/// Only the length is allowed to leak, and it is public (always 128 hex chars for a valid digest).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "abc123";

    /// Reference digest for `{"order_id":"x1","payment_status":"finished"}` under `abc123`
    const FINISHED_SIG: &str = "2267143fcf0c163aa6c0131369f93a879f00021bbafa27641e7f10aa77450779813ff638f8dff01bb395c38c08f142ccf8f544f6e8535017c1346efa861364e7";

    fn finished_payload() -> Value {
        json!({"order_id": "x1", "payment_status": "finished"})
    }

    #[test]
    fn test_sign_matches_reference_digest() {
        let signature = sign_payload(SECRET, &finished_payload(), Canonicalization::AsciiEscaped).expect("should sign");
        assert_eq!(signature, FINISHED_SIG);
        assert_eq!(signature.len(), 128);
    }

    #[test]
    fn test_sign_matches_direct_hmac() {
        let mut mac = HmacSha512::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(br#"{"order_id":"x1","payment_status":"finished"}"#);
        let direct = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign_payload(SECRET, &finished_payload(), Canonicalization::default()).unwrap(), direct);
    }

    #[test]
    fn test_verify_valid_signature() {
        assert!(verify_signature(SECRET, FINISHED_SIG, &finished_payload()).unwrap());
    }

    #[test]
    fn test_verify_altered_signature_character() {
        for idx in [0, 63, 127] {
            let mut altered = FINISHED_SIG.as_bytes().to_vec();
            altered[idx] = if altered[idx] == b'0' { b'1' } else { b'0' };
            let altered = String::from_utf8(altered).unwrap();
            assert!(!verify_signature(SECRET, &altered, &finished_payload()).unwrap());
        }
    }

    #[test]
    fn test_verify_tampered_payload() {
        let tampered = json!({"order_id": "x1", "payment_status": "failed"});
        assert!(!verify_signature(SECRET, FINISHED_SIG, &tampered).unwrap());
    }

    #[test]
    fn test_verify_wrong_secret() {
        assert!(!verify_signature("abc124", FINISHED_SIG, &finished_payload()).unwrap());
    }

    #[test]
    fn test_verify_missing_secret_is_configuration_error() {
        let err = verify_signature("", FINISHED_SIG, &finished_payload()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_verify_is_case_sensitive() {
        let upper = FINISHED_SIG.to_uppercase();
        assert!(!verify_signature(SECRET, &upper, &finished_payload()).unwrap());
    }

    #[test]
    fn test_verify_malformed_signatures() {
        let payload = finished_payload();
        assert!(!verify_signature(SECRET, "", &payload).unwrap());
        assert!(!verify_signature(SECRET, "not-hex", &payload).unwrap());
        assert!(!verify_signature(SECRET, &FINISHED_SIG[..64], &payload).unwrap());
        assert!(!verify_signature(SECRET, &format!("{FINISHED_SIG}00"), &payload).unwrap());
        assert!(!verify_signature(SECRET, &format!(" {FINISHED_SIG}"), &payload).unwrap());
    }

    #[test]
    fn test_verify_empty_payload() {
        assert!(!verify_signature(SECRET, FINISHED_SIG, &json!({})).unwrap());

        let signature = sign_payload(SECRET, &json!({}), Canonicalization::default()).unwrap();
        assert!(verify_signature(SECRET, &signature, &json!({})).unwrap());
    }

    #[test]
    fn test_verify_independent_of_key_order() {
        let reordered: Value = serde_json::from_str(r#"{"payment_status":"finished","order_id":"x1"}"#).unwrap();
        assert!(verify_signature(SECRET, FINISHED_SIG, &reordered).unwrap());
    }

    #[test]
    fn test_nested_payloads_verify_identically() {
        let a: Value = serde_json::from_str(
            r#"{"fee":{"serviceFee":0,"currency":"btc"},"items":[{"b":2,"a":1}],"payment_id":1}"#,
        )
        .unwrap();
        let b: Value = serde_json::from_str(
            r#"{"payment_id":1,"items":[{"a":1,"b":2}],"fee":{"currency":"btc","serviceFee":0}}"#,
        )
        .unwrap();

        let signature = sign_payload(SECRET, &a, Canonicalization::default()).unwrap();
        assert_eq!(Some(signature.clone()), sign_payload(SECRET, &b, Canonicalization::default()));
        assert!(verify_signature(SECRET, &signature, &b).unwrap());

        // Array order is significant
        let swapped: Value = serde_json::from_str(
            r#"{"payment_id":1,"items":[{"a":1,"b":2},{"c":3}],"fee":{"currency":"btc","serviceFee":0}}"#,
        )
        .unwrap();
        assert!(!verify_signature(SECRET, &signature, &swapped).unwrap());
    }

    #[test]
    fn test_reference_vector_with_floats_and_unicode() {
        // Produced by the gateway's reference signer
        let body = r#"{
            "payment_id": 5077125051,
            "payment_status": "waiting",
            "pay_amount": 0.17,
            "price_currency": "usd",
            "fee": {"currency": "btc", "depositFee": 0, "withdrawalFee": 0, "serviceFee": 0},
            "outcome_amount": 1e-05,
            "order_description": "café 😀"
        }"#;
        let payload: Value = serde_json::from_str(body).unwrap();
        let expected = "d41a9cc53ef621629aacff15e438c05942b440151223e501d86b6b10b10bfab27686340ad86a5323787745ee1eca48743b41db84d499b3d8ac2ebd5830efd49c";

        assert!(verify_signature(SECRET, expected, &payload).unwrap());
        assert!(!verify_signature_with(SECRET, expected, &payload, Canonicalization::Utf8).unwrap());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }
}
