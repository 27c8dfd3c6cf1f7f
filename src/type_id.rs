//! Content-derived type ids.
//!
//! Types that carry no explicit id get one from a digest of their canonical
//! serialization: SHA-256, last 8 hex characters, upper-cased, `0x` prefix.
//! The id changes whenever the serialized content changes, and never otherwise.

use sha2::{Digest, Sha256};

/// Number of trailing hex digits kept from the digest.
pub const TYPE_ID_DIGITS: usize = 8;

/// Derive a type id from canonical text.
pub fn content_type_id(canonical: &str) -> String {
    let digest = Sha256::digest(canonical.as_bytes());
    let hex: String = digest.iter().map(|b| format!("{b:02X}")).collect();
    format!("0x{}", &hex[hex.len() - TYPE_ID_DIGITS..])
}
