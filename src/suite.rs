//! Cipher suite selection.
//!
//! A suite pairs an AES key size with an operational mode. Each suite fixes
//! every length parameter the validator needs: key length, IV or nonce
//! length, and whether an authentication tag applies.
//!
//! CFB and OFB are the 8-bit feedback variants (CFB8/OFB8), which turn AES
//! into a byte-granular stream cipher and need no padding.

use std::fmt::{Display, Formatter};

use crate::config::{IV_LENGTH, NONCE_LENGTH};

/// AES operational mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// Cipher block chaining with PKCS7 padding.
    Cbc,

    /// Electronic codebook with PKCS7 padding.
    Ecb,

    /// Cipher feedback, 8-bit units, no padding.
    Cfb,

    /// Output feedback, 8-bit units, no padding.
    Ofb,

    /// Galois/counter mode; authenticated, no padding.
    Gcm,
}

impl Mode {
    /// Lowercase mode token as it appears in suite selectors.
    pub fn token(self) -> &'static str {
        match self {
            Self::Cbc => "cbc",
            Self::Ecb => "ecb",
            Self::Cfb => "cfb",
            Self::Ofb => "ofb",
            Self::Gcm => "gcm",
        }
    }

    /// Human-readable mode name for the usage text.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cbc => "CBC",
            Self::Ecb => "ECB",
            Self::Cfb => "CFB8",
            Self::Ofb => "OFB8",
            Self::Gcm => "GCM",
        }
    }

    fn padding_label(self) -> &'static str {
        match self {
            Self::Cbc | Self::Ecb => "PKCS7Padding",
            Self::Cfb | Self::Ofb | Self::Gcm => "NoPadding",
        }
    }
}

/// A selectable cipher/mode/key-size combination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CipherSuite {
    mode: Mode,
    key_bits: u32,
}

impl CipherSuite {
    /// Every supported suite, in the order the usage text lists them.
    pub const ALL: [Self; 15] = [
        Self::new(Mode::Cbc, 256),
        Self::new(Mode::Cbc, 192),
        Self::new(Mode::Cbc, 128),
        Self::new(Mode::Ecb, 256),
        Self::new(Mode::Ecb, 192),
        Self::new(Mode::Ecb, 128),
        Self::new(Mode::Cfb, 256),
        Self::new(Mode::Cfb, 192),
        Self::new(Mode::Cfb, 128),
        Self::new(Mode::Ofb, 256),
        Self::new(Mode::Ofb, 192),
        Self::new(Mode::Ofb, 128),
        Self::new(Mode::Gcm, 256),
        Self::new(Mode::Gcm, 192),
        Self::new(Mode::Gcm, 128),
    ];

    #[inline]
    #[must_use]
    pub const fn new(mode: Mode, key_bits: u32) -> Self {
        Self { mode, key_bits }
    }

    #[inline]
    pub fn mode(self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn key_bits(self) -> u32 {
        self.key_bits
    }

    /// Command-line selector token, e.g. `aes-256-gcm`.
    pub fn token(self) -> String {
        format!("aes-{}-{}", self.key_bits, self.mode.token())
    }

    /// Usage-text description, e.g. `AES GCM mode NoPadding 256-bit-key`.
    pub fn description(self) -> String {
        format!("AES {} mode {} {}-bit-key", self.mode.label(), self.mode.padding_label(), self.key_bits)
    }

    /// Key length in bytes.
    #[inline]
    pub fn key_length(self) -> usize {
        self.key_bits as usize / 8
    }

    /// IV length in bytes; zero for modes that take no IV.
    #[inline]
    pub fn iv_length(self) -> usize {
        match self.mode {
            Mode::Cbc | Mode::Cfb | Mode::Ofb => IV_LENGTH,
            Mode::Ecb | Mode::Gcm => 0,
        }
    }

    /// Nonce length in bytes; zero for non-AEAD modes.
    #[inline]
    pub fn nonce_length(self) -> usize {
        match self.mode {
            Mode::Gcm => NONCE_LENGTH,
            _ => 0,
        }
    }

    /// Whether the suite is an authenticated mode with a tag and optional AAD.
    #[inline]
    pub fn is_aead(self) -> bool {
        self.mode == Mode::Gcm
    }
}

impl Display for CipherSuite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique() {
        for (i, a) in CipherSuite::ALL.iter().enumerate() {
            for b in &CipherSuite::ALL[i + 1..] {
                assert_ne!(a.token(), b.token());
            }
        }
    }

    #[test]
    fn test_lengths() {
        let cbc = CipherSuite::new(Mode::Cbc, 256);
        assert_eq!(cbc.key_length(), 32);
        assert_eq!(cbc.iv_length(), 16);
        assert_eq!(cbc.nonce_length(), 0);
        assert!(!cbc.is_aead());

        let ecb = CipherSuite::new(Mode::Ecb, 128);
        assert_eq!(ecb.key_length(), 16);
        assert_eq!(ecb.iv_length(), 0);

        let gcm = CipherSuite::new(Mode::Gcm, 192);
        assert_eq!(gcm.key_length(), 24);
        assert_eq!(gcm.iv_length(), 0);
        assert_eq!(gcm.nonce_length(), 12);
        assert!(gcm.is_aead());
    }

    #[test]
    fn test_token_format() {
        assert_eq!(CipherSuite::new(Mode::Gcm, 256).token(), "aes-256-gcm");
        assert_eq!(CipherSuite::new(Mode::Cfb, 128).token(), "aes-128-cfb");
    }

    #[test]
    fn test_description() {
        assert_eq!(CipherSuite::new(Mode::Cbc, 256).description(), "AES CBC mode PKCS7Padding 256-bit-key");
        assert_eq!(CipherSuite::new(Mode::Gcm, 128).description(), "AES GCM mode NoPadding 128-bit-key");
    }
}
