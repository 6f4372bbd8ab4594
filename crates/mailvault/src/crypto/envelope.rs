//! AES-256-CBC envelope with a key-derived IV.

use aes::Aes256;
use cbc::cipher::{
    block_padding::{NoPadding, Pkcs7},
    BlockDecryptMut, BlockEncryptMut, KeyIvInit,
};
use sha3::{Digest, Sha3_256};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// AES block size, which is also the IV length.
pub const BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The envelope is not an IV followed by at least one whole cipher block.
    #[error("malformed envelope: {0} bytes is not a valid envelope length")]
    MalformedEnvelope(usize),
}

/// Encrypt `plaintext` under `key`, returning `IV || ciphertext`.
///
/// Deterministic: the same plaintext and key always give the same bytes.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let iv = derive_iv(key)?;
    let cipher = Aes256CbcEnc::new_from_slices(key, &iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut envelope = Vec::with_capacity(BLOCK_LEN + ciphertext.len());
    envelope.extend_from_slice(&iv);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt an envelope produced by [`encrypt`].
///
/// The IV prefix is skipped, not trusted: the IV is re-derived from `key`.
/// The trailing pad length is read from the last byte and removed without
/// validation, so a wrong key yields arbitrary bytes rather than an error.
/// A pad count larger than the buffer leaves an empty plaintext.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not [`KEY_LEN`] bytes.
/// Returns [`CipherError::MalformedEnvelope`] if the body after the IV is
/// empty or not a whole number of blocks.
pub fn decrypt(envelope: &[u8], key: &[u8]) -> Result<Vec<u8>, CipherError> {
    let iv = derive_iv(key)?;

    if envelope.len() <= BLOCK_LEN || envelope.len() % BLOCK_LEN != 0 {
        return Err(CipherError::MalformedEnvelope(envelope.len()));
    }
    let body = &envelope[BLOCK_LEN..];

    let cipher = Aes256CbcDec::new_from_slices(key, &iv)
        .map_err(|_| CipherError::InvalidKeyLength(key.len()))?;
    let mut plaintext = cipher
        .decrypt_padded_vec_mut::<NoPadding>(body)
        .map_err(|_| CipherError::MalformedEnvelope(envelope.len()))?;

    let pad = plaintext.last().copied().unwrap_or(0) as usize;
    plaintext.truncate(plaintext.len().saturating_sub(pad));
    Ok(plaintext)
}

/// `IV = SHA3-256(key)[..BLOCK_LEN]`.
fn derive_iv(key: &[u8]) -> Result<[u8; BLOCK_LEN], CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    let digest = Sha3_256::digest(key);
    let mut iv = [0u8; BLOCK_LEN];
    iv.copy_from_slice(&digest[..BLOCK_LEN]);
    Ok(iv)
}
