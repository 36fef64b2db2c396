//! # Checkout Signatures
//!
//! The checkout widget returns `razorpay_signature`, which is
//! `hex(HMAC_SHA256(key_secret, order_id + "|" + payment_id))`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Expected signature for an order/payment pair
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    compute_hmac_sha256(secret, &format!("{order_id}|{payment_id}"))
}

/// Check a signature returned by the checkout widget
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    constant_time_compare(&expected_signature(secret, order_id, payment_id), signature)
}

fn compute_hmac_sha256(secret: &str, message: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret";

    #[test]
    fn test_signature_is_deterministic_hex() {
        let a = expected_signature(SECRET, "order_1", "pay_1");
        let b = expected_signature(SECRET, "order_1", "pay_1");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_known_vector() {
        // Widely published HMAC-SHA256 vector
        let sig = compute_hmac_sha256("key", "The quick brown fox jumps over the lazy dog");
        assert_eq!(
            sig,
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_valid_signature_accepted() {
        let sig = expected_signature(SECRET, "order_1", "pay_1");
        assert!(verify_signature(SECRET, "order_1", "pay_1", &sig));
    }

    #[test]
    fn test_single_bit_tamper_rejected() {
        let sig = expected_signature(SECRET, "order_1", "pay_1");
        let mut bytes = sig.into_bytes();
        // '0'..'9' and 'a'..'f' stay within ASCII when bit 0 flips
        bytes[10] ^= 0x01;
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(!verify_signature(SECRET, "order_1", "pay_1", &tampered));
    }

    #[test]
    fn test_swapped_ids_or_wrong_secret_rejected() {
        let sig = expected_signature(SECRET, "order_1", "pay_1");

        assert!(!verify_signature(SECRET, "pay_1", "order_1", &sig));
        assert!(!verify_signature("other", "order_1", "pay_1", &sig));
        assert!(!verify_signature(SECRET, "order_1", "pay_1", ""));
    }

    #[test]
    fn test_padded_signature_rejected() {
        let sig = expected_signature(SECRET, "order_1", "pay_1");

        assert!(!verify_signature(SECRET, "order_1", "pay_1", &format!(" {sig}")));
        assert!(!verify_signature(SECRET, "order_1", "pay_1", &format!("{sig}\n")));
        assert!(!verify_signature(SECRET, "order_1", "pay_1", &sig.to_uppercase()));
    }
}
