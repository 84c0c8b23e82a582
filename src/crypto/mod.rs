//! Streaming cipher construction.
//!
//! The transform engine consumes ciphers through the [`CipherStream`]
//! capability: feed chunks with `update`, collect whatever the mode can emit
//! so far, and call `finalize` exactly once at end of input. Block modes
//! buffer partial blocks internally, the feedback modes emit byte for byte,
//! and GCM holds the whole message until the tag can be produced or checked.

use anyhow::{Result, bail};

use crate::config::TAG_LENGTH_MIN;
use crate::options::ResolvedOptions;
use crate::suite::Mode;

pub mod block;
pub mod derive;
pub mod feedback;
pub mod gcm;

/// Incremental cipher transformation.
///
/// `update` may return fewer (or more) bytes than it consumed; callers must
/// not assume a 1:1 mapping. `finalize` emits any trailing bytes: padding on
/// encrypt, unpadded remainder on decrypt, the authentication tag for AEAD
/// encryption, or nothing for the pure stream modes.
pub trait CipherStream {
    /// Binds additional authenticated data. Only AEAD streams accept this,
    /// and only before the first payload byte.
    fn bind_aad(&mut self, _aad: &[u8]) -> Result<()> {
        bail!("Additional authentication data cannot be specified.");
    }

    /// Feeds a chunk of input, returning whatever output is ready.
    fn update(&mut self, data: &[u8]) -> Result<Vec<u8>>;

    /// Completes the transformation, returning trailing output.
    ///
    /// For AEAD decryption this is where tag verification happens; a
    /// mismatch is a fatal error and no plaintext is returned.
    fn finalize(self: Box<Self>) -> Result<Vec<u8>>;
}

/// Builds the cipher stream described by a validated configuration.
pub fn open_stream(options: &ResolvedOptions) -> Result<Box<dyn CipherStream>> {
    let key_bits = options.suite.key_bits();
    let key = options.key.as_slice();
    let iv = options.iv.as_deref().unwrap_or_default();
    let nonce = options.nonce.as_deref().unwrap_or_default();
    let tag_length = options.tag_length.unwrap_or(TAG_LENGTH_MIN);

    match options.suite.mode() {
        Mode::Cbc => block::cbc_stream(key_bits, key, iv, options.operation),
        Mode::Ecb => block::ecb_stream(key_bits, key, options.operation),
        Mode::Cfb => feedback::cfb8_stream(key_bits, key, iv, options.operation),
        Mode::Ofb => feedback::ofb8_stream(key_bits, key, iv),
        Mode::Gcm => gcm::gcm_stream(key_bits, key, nonce, tag_length, options.operation),
    }
}
