//! Seed hashing.
//!
//! Every random-looking property of an identicon (its pattern and its
//! foreground color) is read from a single SHA-256 digest of the seed.

use std::fmt;

use sha2::{Digest as _, Sha256};

/// Number of hex characters in a [`Digest`].
pub const DIGEST_HEX_LEN: usize = 64;

/// Lowercase hex rendering of the SHA-256 hash of a seed.
///
/// Always exactly [`DIGEST_HEX_LEN`] ASCII hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Hashes the raw UTF-8 bytes of `seed`.
    ///
    /// The seed is hashed exactly as given; no trimming or case folding.
    pub fn of(seed: &str) -> Self {
        let hash = Sha256::digest(seed.as_bytes());
        Self(hex::encode(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `len` hex characters starting at `offset`.
    ///
    /// Returns `None` if the range runs past the end of the digest.
    pub fn slice(&self, offset: usize, len: usize) -> Option<&str> {
        self.0.get(offset..offset.checked_add(len)?)
    }

    /// Iterates the digest as 4-bit values, one per hex character.
    pub fn nibbles(&self) -> impl Iterator<Item = u8> + '_ {
        // Construction guarantees every char is a lowercase hex digit.
        self.0
            .bytes()
            .map(|b| (b as char).to_digit(16).unwrap_or(0) as u8)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(
            Digest::of("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            Digest::of("test@example.com").as_str(),
            "973dfe463ec85785f5f95af5ba3906eedb2d931c24e69824a89ea65dba4e813b"
        );
    }

    #[test]
    fn always_64_lowercase_hex() {
        for seed in ["", "a", "Ünïcödé ✓", &"x".repeat(1000)] {
            let digest = Digest::of(seed);
            assert_eq!(digest.as_str().len(), DIGEST_HEX_LEN);
            assert!(
                digest
                    .as_str()
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
            );
        }
    }

    #[test]
    fn seed_is_not_trimmed() {
        assert_ne!(Digest::of("alice"), Digest::of(" alice "));
    }

    #[test]
    fn slice_bounds() {
        let digest = Digest::of("test@example.com");
        assert_eq!(digest.slice(56, 6), Some("ba4e81"));
        assert_eq!(digest.slice(60, 4), Some("813b"));
        assert_eq!(digest.slice(60, 5), None);
        assert_eq!(digest.slice(usize::MAX, 2), None);
    }

    #[test]
    fn nibbles_match_hex() {
        let digest = Digest::of("abc");
        let first: Vec<u8> = digest.nibbles().take(4).collect();
        assert_eq!(first, vec![0xb, 0xa, 0x7, 0x8]);
        assert_eq!(digest.nibbles().count(), DIGEST_HEX_LEN);
    }
}
