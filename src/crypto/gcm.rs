//! AES-GCM with a selectable tag length.
//!
//! GCM authenticates the message as a whole, so the stream collects every
//! update into memory and runs the AEAD operation once at finalization. On
//! encrypt the tag is appended to the final output; on decrypt the tag is
//! verified first and no plaintext is released unless it matches. This is
//! stricter than emitting plaintext incrementally ahead of the tag check,
//! at the cost of holding the message in memory.

use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::Nonce;
use aes_gcm::{AeadInPlace, AesGcm, KeyInit};
use anyhow::{Result, anyhow, bail};
use cipher::consts::{U12, U13, U14, U15, U16};

use crate::config::NONCE_LENGTH;
use crate::crypto::CipherStream;
use crate::options::Operation;

struct GcmStream<A: AeadInPlace> {
    aead: A,
    nonce: Vec<u8>,
    aad: Vec<u8>,
    data: Vec<u8>,
    operation: Operation,
}

impl<A: AeadInPlace> GcmStream<A> {
    fn new(aead: A, nonce: &[u8], operation: Operation) -> Self {
        Self { aead, nonce: nonce.to_vec(), aad: Vec::new(), data: Vec::new(), operation }
    }
}

impl<A: AeadInPlace> CipherStream for GcmStream<A> {
    fn bind_aad(&mut self, aad: &[u8]) -> Result<()> {
        if !self.data.is_empty() {
            bail!("Additional authentication data must be bound before any payload.");
        }
        self.aad = aad.to_vec();
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.data.extend_from_slice(data);
        Ok(Vec::new())
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        let this = *self;
        if this.nonce.len() != NONCE_LENGTH {
            bail!("Invalid nonce length.");
        }

        let nonce = Nonce::<A>::from_slice(&this.nonce);
        let mut data = this.data;
        match this.operation {
            Operation::Encrypt => this
                .aead
                .encrypt_in_place(nonce, &this.aad, &mut data)
                .map_err(|_| anyhow!("Encryption failed."))?,
            Operation::Decrypt => this
                .aead
                .decrypt_in_place(nonce, &this.aad, &mut data)
                .map_err(|_| anyhow!("Authentication failed: tag mismatch or corrupted data."))?,
        }

        Ok(data)
    }
}

/// Builds an AES-GCM stream for the given key size and tag length.
///
/// The RustCrypto tag size is a type parameter, so each supported length in
/// `[12, 16]` gets its own instantiation.
pub fn gcm_stream(key_bits: u32, key: &[u8], nonce: &[u8], tag_length: usize, operation: Operation) -> Result<Box<dyn CipherStream>> {
    macro_rules! stream {
        ($aes:ty, $tag:ty) => {{
            let aead = AesGcm::<$aes, U12, $tag>::new_from_slice(key).map_err(|_| anyhow!("Invalid key length."))?;
            let stream: Box<dyn CipherStream> = Box::new(GcmStream::new(aead, nonce, operation));
            stream
        }};
    }

    Ok(match (key_bits, tag_length) {
        (128, 12) => stream!(Aes128, U12),
        (128, 13) => stream!(Aes128, U13),
        (128, 14) => stream!(Aes128, U14),
        (128, 15) => stream!(Aes128, U15),
        (128, 16) => stream!(Aes128, U16),
        (192, 12) => stream!(Aes192, U12),
        (192, 13) => stream!(Aes192, U13),
        (192, 14) => stream!(Aes192, U14),
        (192, 15) => stream!(Aes192, U15),
        (192, 16) => stream!(Aes192, U16),
        (256, 12) => stream!(Aes256, U12),
        (256, 13) => stream!(Aes256, U13),
        (256, 14) => stream!(Aes256, U14),
        (256, 15) => stream!(Aes256, U15),
        (256, 16) => stream!(Aes256, U16),
        _ => bail!("Unsupported key length ({key_bits} bits) or tag length ({tag_length} bytes)."),
    })
}
