//! Cipher configuration: the mutable builder filled in during argument
//! scanning and the immutable resolved form handed to the transform engine.
//!
//! Directive actions only ever call the setters on [`CipherOptions`]; once
//! scanning succeeds the builder is consumed by [`CipherOptions::resolve`],
//! which reconciles mutually-exclusive sources, derives missing values and
//! produces a [`ResolvedOptions`] that cannot be mutated afterwards.

use anyhow::{Result, bail};

use crate::config::{TAG_LENGTH_MAX, TAG_LENGTH_MIN};
use crate::crypto::derive;
use crate::hex;
use crate::suite::CipherSuite;

/// Direction of the transformation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// Mutable configuration accumulated by directive actions.
///
/// Each key/IV/nonce field accepts exactly one source: an explicit hex value
/// or a phrase-derived digest. Supplying a second source for the same field
/// is rejected at parse time, before validation runs.
#[derive(Default)]
pub struct CipherOptions {
    suite: Option<CipherSuite>,
    key: Option<Vec<u8>>,
    iv: Option<Vec<u8>>,
    nonce: Option<Vec<u8>>,
    tag_length: Option<usize>,
    aad: Option<Vec<u8>>,
    operation: Option<Operation>,
    input: Option<String>,
    output: Option<String>,
    overwrite: bool,
}

impl CipherOptions {
    /// Selects the cipher suite. A second selection is an error.
    pub fn select_suite(&mut self, suite: CipherSuite) -> Result<()> {
        if self.suite.is_some() {
            bail!("Algorithm is specified more than once.");
        }
        self.suite = Some(suite);
        Ok(())
    }

    pub fn set_key_hex(&mut self, value: &str) -> Result<()> {
        if self.key.is_some() {
            bail!("Private key is already specified.");
        }
        self.key = Some(hex::parse(value)?);
        Ok(())
    }

    pub fn set_key_phrase(&mut self, phrase: &str) -> Result<()> {
        if self.key.is_some() {
            bail!("Private key is already specified.");
        }
        self.key = Some(derive::phrase_digest(phrase));
        Ok(())
    }

    pub fn set_iv_hex(&mut self, value: &str) -> Result<()> {
        if self.iv.is_some() {
            bail!("Initial vector is already specified.");
        }
        self.iv = Some(hex::parse(value)?);
        Ok(())
    }

    pub fn set_iv_phrase(&mut self, phrase: &str) -> Result<()> {
        if self.iv.is_some() {
            bail!("Initial vector is already specified.");
        }
        self.iv = Some(derive::phrase_digest(phrase));
        Ok(())
    }

    pub fn set_nonce_hex(&mut self, value: &str) -> Result<()> {
        if self.nonce.is_some() {
            bail!("Nonce is already specified.");
        }
        self.nonce = Some(hex::parse(value)?);
        Ok(())
    }

    pub fn set_nonce_phrase(&mut self, phrase: &str) -> Result<()> {
        if self.nonce.is_some() {
            bail!("Nonce is already specified.");
        }
        self.nonce = Some(derive::phrase_digest(phrase));
        Ok(())
    }

    /// Sets the AEAD tag length in bytes. Range-checked here so a bad value
    /// fails before any file is touched.
    pub fn set_tag_length(&mut self, value: i64) -> Result<()> {
        if self.tag_length.is_some() {
            bail!("Tag length is already specified.");
        }
        if value < TAG_LENGTH_MIN as i64 || value > TAG_LENGTH_MAX as i64 {
            bail!("Tag length is out of range.");
        }
        self.tag_length = Some(value as usize);
        Ok(())
    }

    pub fn set_aad_hex(&mut self, value: &str) -> Result<()> {
        if self.aad.is_some() {
            bail!("Additional authentication data is already specified.");
        }
        self.aad = Some(hex::parse(value)?);
        Ok(())
    }

    pub fn set_aad_text(&mut self, value: &str) -> Result<()> {
        if self.aad.is_some() {
            bail!("Additional authentication data is already specified.");
        }
        self.aad = Some(value.as_bytes().to_vec());
        Ok(())
    }

    /// Sets the operation together with its input path. `-` selects the
    /// standard input stream.
    pub fn set_input(&mut self, operation: Operation, path: &str) {
        self.operation = Some(operation);
        self.input = Some(path.to_string());
    }

    /// Sets the output path. `-` selects the standard output stream.
    pub fn set_output(&mut self, path: &str) {
        self.output = Some(path.to_string());
    }

    pub fn allow_overwrite(&mut self) {
        self.overwrite = true;
    }

    /// Validates and finalizes the configuration.
    ///
    /// Checks required fields, fits key/IV to the suite's lengths, fills in
    /// the nonce fallback for AEAD mode and rejects parameters the selected
    /// suite cannot use. Performs no I/O.
    pub fn resolve(self) -> Result<ResolvedOptions> {
        let Some(suite) = self.suite else {
            bail!("Algorithm is not specified.");
        };
        let Some(operation) = self.operation else {
            bail!("Mode(encrypt/decrypt) is not specified.");
        };
        let Some(input) = self.input else {
            bail!("Input file is not specified.");
        };
        let Some(output) = self.output else {
            bail!("Output file is not specified.");
        };

        let Some(key) = self.key else {
            bail!("Private key is not specified.");
        };
        let key = fit_length(key, suite.key_length(), "Private key")?;

        let iv = if suite.iv_length() > 0 {
            let Some(iv) = self.iv else {
                bail!("Initial vector is not specified.");
            };
            Some(fit_length(iv, suite.iv_length(), "Initial vector")?)
        } else if self.iv.is_some() {
            bail!("Initial vector is not required.");
        } else {
            None
        };

        let nonce = if suite.nonce_length() > 0 {
            // Weak fallback: without an explicit nonce or phrase, one is
            // derived from the wall-clock timestamp. Unique enough across
            // invocations but not unpredictable; callers in adversarial
            // settings must supply their own.
            let nonce = self.nonce.unwrap_or_else(derive::timestamp_digest);
            Some(fit_length(nonce, suite.nonce_length(), "Nonce")?)
        } else if self.nonce.is_some() {
            bail!("Nonce is not required.");
        } else {
            None
        };

        let tag_length = if suite.is_aead() {
            Some(self.tag_length.unwrap_or(TAG_LENGTH_MIN))
        } else if self.tag_length.is_some() {
            bail!("Tag length cannot be specified.");
        } else {
            None
        };

        if !suite.is_aead() && self.aad.is_some() {
            bail!("Additional authentication data cannot be specified.");
        }

        Ok(ResolvedOptions {
            suite,
            operation,
            input,
            output,
            overwrite: self.overwrite,
            key,
            iv,
            nonce,
            tag_length,
            aad: self.aad,
        })
    }
}

/// Immutable, fully validated configuration.
#[derive(Debug)]
pub struct ResolvedOptions {
    pub suite: CipherSuite,
    pub operation: Operation,
    pub input: String,
    pub output: String,
    pub overwrite: bool,
    pub key: Vec<u8>,
    pub iv: Option<Vec<u8>>,
    pub nonce: Option<Vec<u8>>,
    pub tag_length: Option<usize>,
    pub aad: Option<Vec<u8>>,
}

/// Fits a supplied or derived buffer to the exact length the suite needs.
///
/// Longer buffers are truncated (a phrase digest is 32 bytes for every key
/// size). Shorter buffers are an error rather than being zero-extended; a
/// silently padded key would encrypt under different material than the user
/// believes.
fn fit_length(mut value: Vec<u8>, length: usize, name: &str) -> Result<Vec<u8>> {
    if value.len() < length {
        bail!("{name} is too short ({} bytes given, {length} required).", value.len());
    }
    value.truncate(length);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::Mode;

    fn base(mode: Mode, bits: u32) -> CipherOptions {
        let mut options = CipherOptions::default();
        options.select_suite(CipherSuite::new(mode, bits)).unwrap();
        options.set_input(Operation::Encrypt, "in.dat");
        options.set_output("out.dat");
        options
    }

    #[test]
    fn test_resolve_cbc_from_phrases() {
        let mut options = base(Mode::Cbc, 256);
        options.set_key_phrase("xyzzy").unwrap();
        options.set_iv_phrase("20241210").unwrap();

        let resolved = options.resolve().unwrap();
        assert_eq!(hex::encode(&resolved.key), "184858A00FD7971F810848266EBCECEE5E8B69972C5FFAED622F5EE078671AED");
        assert_eq!(hex::encode(resolved.iv.as_deref().unwrap()), "B87E2F0E1BEB474894C501960ECBE847");
        assert!(resolved.nonce.is_none());
        assert!(resolved.tag_length.is_none());
    }

    #[test]
    fn test_phrase_key_truncated_per_key_size() {
        for (bits, len) in [(128, 16), (192, 24), (256, 32)] {
            let mut options = base(Mode::Ecb, bits);
            options.set_key_phrase("xyzzy").unwrap();
            let resolved = options.resolve().unwrap();
            assert_eq!(resolved.key.len(), len);
        }
    }

    #[test]
    fn test_suite_selected_twice() {
        let mut options = base(Mode::Cbc, 256);
        let err = options.select_suite(CipherSuite::new(Mode::Ecb, 128)).unwrap_err();
        assert_eq!(err.to_string(), "Algorithm is specified more than once.");
    }

    #[test]
    fn test_key_and_phrase_conflict() {
        let mut options = CipherOptions::default();
        options.set_key_hex("00112233").unwrap();
        let err = options.set_key_phrase("xyzzy").unwrap_err();
        assert_eq!(err.to_string(), "Private key is already specified.");
    }

    #[test]
    fn test_iv_and_phrase_conflict() {
        let mut options = CipherOptions::default();
        options.set_iv_phrase("a").unwrap();
        assert!(options.set_iv_hex("00").is_err());
    }

    #[test]
    fn test_nonce_and_phrase_conflict() {
        let mut options = CipherOptions::default();
        options.set_nonce_hex("00").unwrap();
        assert!(options.set_nonce_phrase("b").is_err());
    }

    #[test]
    fn test_tag_length_out_of_range() {
        let mut options = CipherOptions::default();
        assert!(options.set_tag_length(11).is_err());
        assert!(options.set_tag_length(17).is_err());
        assert!(options.set_tag_length(12).is_ok());
    }

    #[test]
    fn test_tag_length_defaults_to_minimum() {
        let mut options = base(Mode::Gcm, 256);
        options.set_key_phrase("xyzzy").unwrap();
        options.set_nonce_phrase("n").unwrap();
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.tag_length, Some(TAG_LENGTH_MIN));
    }

    #[test]
    fn test_missing_algorithm() {
        let mut options = CipherOptions::default();
        options.set_input(Operation::Encrypt, "in.dat");
        options.set_output("out.dat");
        options.set_key_phrase("xyzzy").unwrap();
        assert_eq!(options.resolve().unwrap_err().to_string(), "Algorithm is not specified.");
    }

    #[test]
    fn test_missing_operation() {
        let mut options = CipherOptions::default();
        options.select_suite(CipherSuite::new(Mode::Ecb, 256)).unwrap();
        options.set_output("out.dat");
        options.set_key_phrase("xyzzy").unwrap();
        assert_eq!(options.resolve().unwrap_err().to_string(), "Mode(encrypt/decrypt) is not specified.");
    }

    #[test]
    fn test_missing_output() {
        let mut options = CipherOptions::default();
        options.select_suite(CipherSuite::new(Mode::Ecb, 256)).unwrap();
        options.set_input(Operation::Encrypt, "in.dat");
        options.set_key_phrase("xyzzy").unwrap();
        assert_eq!(options.resolve().unwrap_err().to_string(), "Output file is not specified.");
    }

    #[test]
    fn test_missing_key() {
        let options = base(Mode::Ecb, 256);
        assert_eq!(options.resolve().unwrap_err().to_string(), "Private key is not specified.");
    }

    #[test]
    fn test_missing_iv() {
        let mut options = base(Mode::Cbc, 256);
        options.set_key_phrase("xyzzy").unwrap();
        assert_eq!(options.resolve().unwrap_err().to_string(), "Initial vector is not specified.");
    }

    #[test]
    fn test_iv_not_required_for_ecb() {
        let mut options = base(Mode::Ecb, 256);
        options.set_key_phrase("xyzzy").unwrap();
        options.set_iv_phrase("spare").unwrap();
        assert_eq!(options.resolve().unwrap_err().to_string(), "Initial vector is not required.");
    }

    #[test]
    fn test_nonce_not_required_for_cbc() {
        let mut options = base(Mode::Cbc, 256);
        options.set_key_phrase("xyzzy").unwrap();
        options.set_iv_phrase("iv").unwrap();
        options.set_nonce_phrase("spare").unwrap();
        assert_eq!(options.resolve().unwrap_err().to_string(), "Nonce is not required.");
    }

    #[test]
    fn test_nonce_fallback_is_generated() {
        let mut options = base(Mode::Gcm, 128);
        options.set_key_phrase("xyzzy").unwrap();
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.nonce.as_deref().unwrap().len(), 12);
    }

    #[test]
    fn test_aad_rejected_without_gcm() {
        let mut options = base(Mode::Cbc, 256);
        options.set_key_phrase("xyzzy").unwrap();
        options.set_iv_phrase("iv").unwrap();
        options.set_aad_text("context").unwrap();
        assert_eq!(options.resolve().unwrap_err().to_string(), "Additional authentication data cannot be specified.");
    }

    #[test]
    fn test_aad_accepted_with_gcm() {
        let mut options = base(Mode::Gcm, 256);
        options.set_key_phrase("xyzzy").unwrap();
        options.set_aad_text("context").unwrap();
        let resolved = options.resolve().unwrap();
        assert_eq!(resolved.aad.as_deref(), Some(b"context".as_slice()));
    }

    #[test]
    fn test_short_explicit_key_rejected() {
        let mut options = base(Mode::Ecb, 256);
        options.set_key_hex("00112233").unwrap();
        let err = options.resolve().unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_resolved_options_are_debuggable() {
        // assert_eq!/unwrap_err on resolve() need Debug on both sides.
        let mut options = base(Mode::Ecb, 128);
        options.set_key_phrase("xyzzy").unwrap();
        let resolved = options.resolve().unwrap();
        assert!(format!("{resolved:?}").contains("ResolvedOptions"));
    }

    #[test]
    fn test_long_explicit_key_truncated() {
        let mut options = base(Mode::Ecb, 128);
        options.set_key_hex("184858A00FD7971F810848266EBCECEE5E8B69972C5FFAED622F5EE078671AED").unwrap();
        let resolved = options.resolve().unwrap();
        assert_eq!(hex::encode(&resolved.key), "184858A00FD7971F810848266EBCECEE");
    }
}
