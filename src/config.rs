//! Global configuration constants.
//!
//! Cryptographic parameter sizes and processing limits shared across the
//! application. The cipher-suite table in [`crate::suite`] derives its
//! per-suite lengths from these values.

/// Application name used in the usage banner.
pub const APP_NAME: &str = "aescat";

/// AES block size in bytes.
///
/// All supported key sizes (128/192/256 bits) share the 16-byte block.
pub const BLOCK_SIZE: usize = 16;

/// Initialization vector size in bytes for the chaining and feedback modes
/// (CBC, CFB, OFB). Equal to the AES block size.
pub const IV_LENGTH: usize = 16;

/// Nonce size in bytes for AES-GCM.
///
/// 12 bytes (96 bits) is the recommended GCM nonce size; other sizes force
/// an extra GHASH pass and are not exposed here.
pub const NONCE_LENGTH: usize = 12;

/// Minimum authentication tag length in bytes for AES-GCM.
///
/// Also the default when no `-tag` directive is given.
pub const TAG_LENGTH_MIN: usize = 12;

/// Maximum authentication tag length in bytes for AES-GCM.
pub const TAG_LENGTH_MAX: usize = 16;

/// Size of a SHA-256 digest in bytes.
///
/// Phrase-derived keys, IVs and nonces all start from a single SHA-256
/// digest of the phrase, so 32 bytes is the upper bound on every derived
/// parameter before truncation.
pub const DIGEST_LENGTH: usize = 32;

/// Read buffer capacity for the streaming transform loop.
///
/// Any bounded size works; 8 KiB keeps peak memory small while amortizing
/// syscall overhead for typical file sizes.
pub const BUFFER_SIZE: usize = 8192;
