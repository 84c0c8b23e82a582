//! Phrase-based parameter derivation.
//!
//! Keys, IVs and nonces may all be given as a text phrase instead of hex; the
//! phrase is run through a single round of SHA-256 and the digest is later
//! truncated to whatever length the selected suite needs. This is a
//! convenience shortcut, not a password KDF: there is no salt and no work
//! factor, so a guessable phrase stays guessable.

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// SHA-256 digest of the phrase's UTF-8 bytes.
#[must_use]
pub fn phrase_digest(phrase: &str) -> Vec<u8> {
    Sha256::digest(phrase.as_bytes()).to_vec()
}

/// Nonce fallback: digest of the current wall-clock time in decimal
/// milliseconds.
///
/// Unique across invocations under normal clock behavior, but derived from a
/// predictable source; only used when the user supplies neither a nonce nor
/// a nonce phrase, and documented as weak.
#[must_use]
pub fn timestamp_digest() -> Vec<u8> {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    phrase_digest(&millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DIGEST_LENGTH;

    #[test]
    fn test_phrase_digest_deterministic() {
        assert_eq!(phrase_digest("xyzzy"), phrase_digest("xyzzy"));
    }

    #[test]
    fn test_phrase_digest_known_answer() {
        let digest = phrase_digest("xyzzy");
        assert_eq!(crate::hex::encode(&digest), "184858A00FD7971F810848266EBCECEE5E8B69972C5FFAED622F5EE078671AED");
    }

    #[test]
    fn test_different_phrases_differ() {
        assert_ne!(phrase_digest("xyzzy"), phrase_digest("xyzzz"));
        assert_ne!(phrase_digest(""), phrase_digest(" "));
    }

    #[test]
    fn test_timestamp_digest_length() {
        assert_eq!(timestamp_digest().len(), DIGEST_LENGTH);
    }
}
