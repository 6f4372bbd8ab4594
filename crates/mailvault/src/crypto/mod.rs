//! Token derivation and the deterministic cipher envelope.
//!
//! This module is intentionally free of store, mail, and HTTP dependencies.
//!
//! # Envelope format
//!
//! ```text
//! IV (16 bytes) || AES-256-CBC(PKCS#7(plaintext))
//! IV = SHA3-256(key)[..16]
//! ```
//!
//! The IV is a function of the key, so identical plaintext under the same key
//! always yields an identical envelope. There is no authentication tag: a
//! wrong key or tampered ciphertext decrypts to garbage, not to an error.
//! Stored records depend on this exact layout; do not change it without a
//! migration.

pub mod envelope;
pub mod token;

pub use envelope::{decrypt, encrypt, CipherError, KEY_LEN};
pub use token::Token;
