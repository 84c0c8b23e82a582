//! Padded block modes: CBC and ECB with PKCS7.
//!
//! Both streams buffer a partial block between updates. The encryptor can
//! flush every complete block immediately because padding always appends a
//! final block. The decryptor must hold the last complete block back until
//! finalization, since only then is it known to carry the padding.

use aes::{Aes128, Aes192, Aes256};
use anyhow::{Result, anyhow, bail};
use cipher::block_padding::Pkcs7;
use cipher::{Block, BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};

use crate::crypto::CipherStream;
use crate::options::Operation;

struct PaddedEncryptStream<M: BlockEncryptMut> {
    inner: M,
    pending: Vec<u8>,
}

impl<M: BlockEncryptMut> PaddedEncryptStream<M> {
    fn new(inner: M) -> Self {
        Self { inner, pending: Vec::new() }
    }
}

impl<M: BlockEncryptMut> CipherStream for PaddedEncryptStream<M> {
    fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.pending.extend_from_slice(data);

        let block_size = M::block_size();
        let emit = self.pending.len() - self.pending.len() % block_size;
        let mut out: Vec<u8> = self.pending.drain(..emit).collect();
        for chunk in out.chunks_exact_mut(block_size) {
            self.inner.encrypt_block_mut(Block::<M>::from_mut_slice(chunk));
        }

        Ok(out)
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        let this = *self;

        // pending holds less than one block; pad it out to exactly one.
        let mut tail = vec![0u8; M::block_size()];
        tail[..this.pending.len()].copy_from_slice(&this.pending);
        let encrypted = this
            .inner
            .encrypt_padded_mut::<Pkcs7>(&mut tail, this.pending.len())
            .map_err(|_| anyhow!("Padding failed."))?;

        Ok(encrypted.to_vec())
    }
}

struct PaddedDecryptStream<M: BlockDecryptMut> {
    inner: M,
    pending: Vec<u8>,
}

impl<M: BlockDecryptMut> PaddedDecryptStream<M> {
    fn new(inner: M) -> Self {
        Self { inner, pending: Vec::new() }
    }
}

impl<M: BlockDecryptMut> CipherStream for PaddedDecryptStream<M> {
    fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.pending.extend_from_slice(data);

        // Retain one complete block for finalization.
        let block_size = M::block_size();
        let keep = match self.pending.len() % block_size {
            0 => block_size.min(self.pending.len()),
            partial => partial,
        };
        let emit = self.pending.len() - keep;
        let mut out: Vec<u8> = self.pending.drain(..emit).collect();
        for chunk in out.chunks_exact_mut(block_size) {
            self.inner.decrypt_block_mut(Block::<M>::from_mut_slice(chunk));
        }

        Ok(out)
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        let this = *self;

        if this.pending.len() != M::block_size() {
            bail!("Ciphertext length is not a multiple of the cipher block size.");
        }
        let mut tail = this.pending;
        let decrypted = this
            .inner
            .decrypt_padded_mut::<Pkcs7>(&mut tail)
            .map_err(|_| anyhow!("Invalid padding: wrong key or corrupted data."))?;

        Ok(decrypted.to_vec())
    }
}

/// Builds a CBC stream for the given key size and direction.
pub fn cbc_stream(key_bits: u32, key: &[u8], iv: &[u8], operation: Operation) -> Result<Box<dyn CipherStream>> {
    let bad_length = || anyhow!("Invalid key or IV length.");
    Ok(match (key_bits, operation) {
        (128, Operation::Encrypt) => Box::new(PaddedEncryptStream::new(cbc::Encryptor::<Aes128>::new_from_slices(key, iv).map_err(|_| bad_length())?)),
        (128, Operation::Decrypt) => Box::new(PaddedDecryptStream::new(cbc::Decryptor::<Aes128>::new_from_slices(key, iv).map_err(|_| bad_length())?)),
        (192, Operation::Encrypt) => Box::new(PaddedEncryptStream::new(cbc::Encryptor::<Aes192>::new_from_slices(key, iv).map_err(|_| bad_length())?)),
        (192, Operation::Decrypt) => Box::new(PaddedDecryptStream::new(cbc::Decryptor::<Aes192>::new_from_slices(key, iv).map_err(|_| bad_length())?)),
        (256, Operation::Encrypt) => Box::new(PaddedEncryptStream::new(cbc::Encryptor::<Aes256>::new_from_slices(key, iv).map_err(|_| bad_length())?)),
        (256, Operation::Decrypt) => Box::new(PaddedDecryptStream::new(cbc::Decryptor::<Aes256>::new_from_slices(key, iv).map_err(|_| bad_length())?)),
        _ => bail!("Unsupported key length: {key_bits} bits."),
    })
}

/// Builds an ECB stream for the given key size and direction.
pub fn ecb_stream(key_bits: u32, key: &[u8], operation: Operation) -> Result<Box<dyn CipherStream>> {
    let bad_length = || anyhow!("Invalid key length.");
    Ok(match (key_bits, operation) {
        (128, Operation::Encrypt) => Box::new(PaddedEncryptStream::new(ecb::Encryptor::<Aes128>::new_from_slice(key).map_err(|_| bad_length())?)),
        (128, Operation::Decrypt) => Box::new(PaddedDecryptStream::new(ecb::Decryptor::<Aes128>::new_from_slice(key).map_err(|_| bad_length())?)),
        (192, Operation::Encrypt) => Box::new(PaddedEncryptStream::new(ecb::Encryptor::<Aes192>::new_from_slice(key).map_err(|_| bad_length())?)),
        (192, Operation::Decrypt) => Box::new(PaddedDecryptStream::new(ecb::Decryptor::<Aes192>::new_from_slice(key).map_err(|_| bad_length())?)),
        (256, Operation::Encrypt) => Box::new(PaddedEncryptStream::new(ecb::Encryptor::<Aes256>::new_from_slice(key).map_err(|_| bad_length())?)),
        (256, Operation::Decrypt) => Box::new(PaddedDecryptStream::new(ecb::Decryptor::<Aes256>::new_from_slice(key).map_err(|_| bad_length())?)),
        _ => bail!("Unsupported key length: {key_bits} bits."),
    })
}
