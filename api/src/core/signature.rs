//! `X-H1-Signature` verification: `sha256=<hex>` HMAC-SHA256 of the raw body.

use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-h1-signature";

/// Checks `header` against the HMAC of `body` under `secret`.
///
/// The digest comparison is constant-time. A header without the `sha256=`
/// prefix or with non-hex digits never matches.
pub fn verify(secret: &[u8], body: &[u8], header: &str) -> bool {
    let Some((algo, digest)) = header.trim().split_once('=') else {
        return false;
    };
    if !algo.eq_ignore_ascii_case("sha256") {
        return false;
    }
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Header value a sender would attach to `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret)?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"s3cret";
    const BODY: &[u8] = br#"{"data":{"report":{"id":"2571"}}}"#;

    #[test]
    fn own_signature_verifies() {
        assert!(verify(SECRET, BODY, &sign(SECRET, BODY).unwrap()));
        assert!(verify(SECRET, BODY, &sign(SECRET, BODY).unwrap().replacen("sha256", "SHA256", 1)));
    }

    #[test]
    fn any_single_byte_change_is_rejected() {
        let good = sign(SECRET, BODY).unwrap();

        for i in 0..BODY.len() {
            let mut body = BODY.to_vec();
            body[i] ^= 0x01;
            assert!(!verify(SECRET, &body, &good), "body byte {i}");
        }

        let hex_start = "sha256=".len();
        for i in hex_start..good.len() {
            let mut sig = good.clone().into_bytes();
            sig[i] = if sig[i] == b'0' { b'1' } else { b'0' };
            let sig = String::from_utf8(sig).unwrap();
            assert!(!verify(SECRET, BODY, &sig), "signature char {i}");
        }

        assert!(!verify(b"other", BODY, &good));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        let digest = sign(SECRET, BODY).unwrap().trim_start_matches("sha256=").to_string();
        assert!(!verify(SECRET, BODY, &digest));
        assert!(!verify(SECRET, BODY, &format!("sha1={digest}")));
        assert!(!verify(SECRET, BODY, "sha256=zz"));
        assert!(!verify(SECRET, BODY, ""));
    }
}
