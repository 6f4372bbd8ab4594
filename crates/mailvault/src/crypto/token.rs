//! Bearer token derivation.
//!
//! `Token = SHA3-256(password)`. No salt, no per-account randomness: the same
//! password always yields the same token, which is at once the public bearer
//! credential, the store key (as hex), and the envelope key (as raw bytes).
//! Holding the token is therefore equivalent to holding the password.

use sha3::{Digest, Sha3_256};

use super::KEY_LEN;

/// Raw 32-byte token. Zeroed on drop on a best-effort basis: the stores are
/// not volatile, so the compiler may elide them.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(Box<[u8; KEY_LEN]>);

impl Token {
    /// Derive the token for `password`.
    pub fn derive(password: &[u8]) -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&Sha3_256::digest(password));
        Self(buf)
    }

    /// Raw digest bytes, used as the envelope key.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Lowercase hex rendering, used as the bearer value and store key.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0[..])
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}
