//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header carries `t=<unix>,v1=<hex>` pairs where the
//! signature is HMAC-SHA256 over `{t}.{body}` keyed by the endpoint secret.
//! Comparison must be constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parsed `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: String,
    /// All `v1` signatures present; any one matching verifies the payload
    /// (Stripe sends several during secret rotation).
    pub signatures: Vec<String>,
}

/// Parse a `Stripe-Signature` header value.
///
/// Returns `None` when the header is structurally invalid (no timestamp or
/// no `v1` signature).
#[must_use]
pub fn parse_signature_header(value: &str) -> Option<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in value.split(',') {
        let (key, val) = part.trim().split_once('=')?;
        match key {
            "t" => timestamp = Some(val.to_string()),
            "v1" => signatures.push(val.to_string()),
            // v0 and unknown schemes are ignored
            _ => {}
        }
    }

    let timestamp = timestamp?;
    if timestamp.is_empty() || signatures.is_empty() {
        return None;
    }

    Some(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Compute the expected hex signature for a payload.
#[must_use]
pub fn compute_signature(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");

    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);

    hex::encode(mac.finalize().into_bytes())
}

/// Verify a raw `Stripe-Signature` header value against the payload.
#[must_use]
pub fn verify_signature(header_value: &str, secret: &str, body: &[u8]) -> bool {
    let Some(header) = parse_signature_header(header_value) else {
        return false;
    };

    let expected = compute_signature(secret, &header.timestamp, body);

    header
        .signatures
        .iter()
        .any(|candidate| constant_time_eq(candidate.as_bytes(), expected.as_bytes()))
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn signed_header(body: &[u8], timestamp: &str) -> String {
        format!("t={timestamp},v1={}", compute_signature(SECRET, timestamp, body))
    }

    #[test]
    fn parse_valid_header() {
        let header = parse_signature_header("t=1706400000,v1=abc123").unwrap();
        assert_eq!(header.timestamp, "1706400000");
        assert_eq!(header.signatures, vec!["abc123".to_string()]);
    }

    #[test]
    fn parse_multiple_v1_signatures() {
        let header =
            parse_signature_header("t=1706400000,v1=aaa,v0=legacy,v1=bbb").unwrap();
        assert_eq!(header.signatures.len(), 2);
    }

    #[test]
    fn parse_rejects_missing_timestamp() {
        assert!(parse_signature_header("v1=abc123").is_none());
    }

    #[test]
    fn parse_rejects_missing_signature() {
        assert!(parse_signature_header("t=1706400000").is_none());
        assert!(parse_signature_header("t=1706400000,v0=old").is_none());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_signature_header("not a header").is_none());
        assert!(parse_signature_header("").is_none());
    }

    #[test]
    fn signature_is_deterministic_hex() {
        let sig = compute_signature(SECRET, "1706400000", b"payload");
        assert_eq!(sig, compute_signature(SECRET, "1706400000", b"payload"));
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn verify_accepts_valid_signature() {
        let body = br#"{"id": "evt_1"}"#;
        let header = signed_header(body, "1706400000");
        assert!(verify_signature(&header, SECRET, body));
    }

    #[test]
    fn verify_rejects_tampered_body() {
        let header = signed_header(b"original", "1706400000");
        assert!(!verify_signature(&header, SECRET, b"tampered"));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let body = b"payload";
        let header = signed_header(body, "1706400000");
        assert!(!verify_signature(&header, "whsec_other", body));
    }

    #[test]
    fn verify_rejects_malformed_header() {
        assert!(!verify_signature("bogus", SECRET, b"payload"));
    }

    #[test]
    fn verify_accepts_any_matching_rotation_signature() {
        let body = b"payload";
        let timestamp = "1706400000";
        let good = compute_signature(SECRET, timestamp, body);
        let header = format!("t={timestamp},v1=deadbeef,v1={good}");
        assert!(verify_signature(&header, SECRET, body));
    }
}
