//! Request signing for the Tapo cloud API.
//!
//! The login endpoint rejects any request whose `signature` parameter does
//! not match what the server derives from the other parameters and the
//! shared application key:
//!
//! 1. sort parameters by key (byte order)
//! 2. percent-encode every value, nothing treated as safe
//! 3. join as `key=value&key=value` with the encoded values verbatim
//! 4. base64 the joined string
//! 5. HMAC-SHA256 the base64 text with the application key
//! 6. lowercase hex of the digest

use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// SHA-1 of the raw password bytes as lowercase hex (40 chars).
///
/// This is the `cloudPassword` value the login endpoint expects.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha1::digest(password.as_bytes()))
}

/// Build the canonical `key=value&...` string covered by the signature.
///
/// Keys are sorted by their bytes and joined verbatim; every value is
/// percent-encoded once. The joined pairs are not encoded again.
pub fn string_to_sign<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = params.into_iter().collect();
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compute the request signature over `params` with the shared `key`.
pub fn sign<'a, I>(params: I, key: &str) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let canonical = string_to_sign(params);
    let encoded = base64::engine::general_purpose::STANDARD.encode(canonical.as_bytes());

    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can accept any key length");
    mac.update(encoded.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    tracing::debug!(string_to_sign = %canonical, base64 = %encoded, %signature, "signed request");

    signature
}
