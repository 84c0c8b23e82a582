//! Byte-granular feedback modes: CFB8 and OFB8.
//!
//! Both process one byte per cipher unit, so updates emit exactly as many
//! bytes as they consume and finalization has nothing left to flush.
//!
//! CFB8 comes from the `cfb8` crate, whose encryptor and decryptor expose a
//! one-byte block size. OFB8 has no published RustCrypto mode crate, so the
//! shift-register feedback is driven here directly over the block cipher:
//! encrypt the register, take the first keystream byte, XOR it into the data
//! byte and shift the keystream byte into the register's tail.

use aes::{Aes128, Aes192, Aes256};
use anyhow::{Result, anyhow, bail};
use cipher::{Block, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit};

use crate::crypto::CipherStream;
use crate::options::Operation;

struct Cfb8EncryptStream<M: BlockEncryptMut> {
    inner: M,
}

impl<M: BlockEncryptMut> CipherStream for Cfb8EncryptStream<M> {
    fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = data.to_vec();
        for chunk in out.chunks_exact_mut(M::block_size()) {
            self.inner.encrypt_block_mut(Block::<M>::from_mut_slice(chunk));
        }
        Ok(out)
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

struct Cfb8DecryptStream<M: BlockDecryptMut> {
    inner: M,
}

impl<M: BlockDecryptMut> CipherStream for Cfb8DecryptStream<M> {
    fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = data.to_vec();
        for chunk in out.chunks_exact_mut(M::block_size()) {
            self.inner.decrypt_block_mut(Block::<M>::from_mut_slice(chunk));
        }
        Ok(out)
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// OFB with 8-bit feedback. Encryption and decryption are the same keystream
/// XOR, so one stream type serves both directions.
struct Ofb8Stream<C: BlockEncrypt> {
    cipher: C,
    register: Block<C>,
}

impl<C: BlockEncrypt> Ofb8Stream<C> {
    fn new(cipher: C, iv: &[u8]) -> Result<Self> {
        if iv.len() != C::block_size() {
            bail!("Invalid IV length.");
        }
        Ok(Self { cipher, register: Block::<C>::clone_from_slice(iv) })
    }
}

impl<C: BlockEncrypt> CipherStream for Ofb8Stream<C> {
    fn update(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len());
        let last = self.register.len() - 1;
        for &byte in data {
            let mut keystream = self.register.clone();
            self.cipher.encrypt_block(&mut keystream);
            let k = keystream[0];
            out.push(byte ^ k);
            self.register.rotate_left(1);
            self.register[last] = k;
        }
        Ok(out)
    }

    fn finalize(self: Box<Self>) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Builds a CFB8 stream for the given key size and direction.
pub fn cfb8_stream(key_bits: u32, key: &[u8], iv: &[u8], operation: Operation) -> Result<Box<dyn CipherStream>> {
    let bad_length = || anyhow!("Invalid key or IV length.");
    Ok(match (key_bits, operation) {
        (128, Operation::Encrypt) => Box::new(Cfb8EncryptStream { inner: cfb8::Encryptor::<Aes128>::new_from_slices(key, iv).map_err(|_| bad_length())? }),
        (128, Operation::Decrypt) => Box::new(Cfb8DecryptStream { inner: cfb8::Decryptor::<Aes128>::new_from_slices(key, iv).map_err(|_| bad_length())? }),
        (192, Operation::Encrypt) => Box::new(Cfb8EncryptStream { inner: cfb8::Encryptor::<Aes192>::new_from_slices(key, iv).map_err(|_| bad_length())? }),
        (192, Operation::Decrypt) => Box::new(Cfb8DecryptStream { inner: cfb8::Decryptor::<Aes192>::new_from_slices(key, iv).map_err(|_| bad_length())? }),
        (256, Operation::Encrypt) => Box::new(Cfb8EncryptStream { inner: cfb8::Encryptor::<Aes256>::new_from_slices(key, iv).map_err(|_| bad_length())? }),
        (256, Operation::Decrypt) => Box::new(Cfb8DecryptStream { inner: cfb8::Decryptor::<Aes256>::new_from_slices(key, iv).map_err(|_| bad_length())? }),
        _ => bail!("Unsupported key length: {key_bits} bits."),
    })
}

/// Builds an OFB8 stream for the given key size; direction-agnostic.
pub fn ofb8_stream(key_bits: u32, key: &[u8], iv: &[u8]) -> Result<Box<dyn CipherStream>> {
    let bad_length = || anyhow!("Invalid key length.");
    Ok(match key_bits {
        128 => Box::new(Ofb8Stream::new(Aes128::new_from_slice(key).map_err(|_| bad_length())?, iv)?),
        192 => Box::new(Ofb8Stream::new(Aes192::new_from_slice(key).map_err(|_| bad_length())?, iv)?),
        256 => Box::new(Ofb8Stream::new(Aes256::new_from_slice(key).map_err(|_| bad_length())?, iv)?),
        _ => bail!("Unsupported key length: {key_bits} bits."),
    })
}
