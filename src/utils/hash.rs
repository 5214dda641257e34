//! Content hashing for cache-busting filenames.
//!
//! Uses blake3 for a stable digest of the final output bytes, hex-encoded
//! and truncated so it stays readable inside a filename.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let fp = hash::fingerprint(css.as_bytes()); // -> "3f2a9c01b7de"
//! ```

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 12;

/// Compute the full blake3 digest as a hex string.
#[inline]
pub fn digest<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex::encode(blake3::hash(data.as_ref()).as_bytes())
}

/// Compute a short hex fingerprint of `data`.
///
/// Identical input always yields the identical fingerprint.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    let mut hex = digest(data);
    hex.truncate(FINGERPRINT_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_length_and_charset() {
        let fp = fingerprint("body{color:red}");
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        assert_eq!(fingerprint("a{}"), fingerprint("a{}"));
        assert_ne!(fingerprint("a{}"), fingerprint("b{}"));
    }

    #[test]
    fn test_fingerprint_is_digest_prefix() {
        let data = b"h1{margin:0}";
        assert!(digest(data).starts_with(&fingerprint(data)));
        assert_eq!(digest(data).len(), 64);
    }
}
