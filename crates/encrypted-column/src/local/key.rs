//! [`MasterKey`]: the loopback client's root key and per-object key derivation.

use std::fmt;

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::cipher::KEY_LEN;

/// Errors produced when loading key material.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The supplied key material has an unexpected length.
    #[error("master key has invalid length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),

    /// The HMAC could not be keyed.
    #[error("object key derivation failed")]
    Derivation,
}

/// Fixed-size key buffer holding exactly [`KEY_LEN`] bytes.
///
/// Overwritten with zeroes on drop. `Debug` never prints the bytes.
#[derive(Clone)]
pub struct KeyBytes(Box<[u8; KEY_LEN]>);

impl KeyBytes {
    /// Borrow the raw key bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Drop for KeyBytes {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for KeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyBytes([REDACTED])")
    }
}

/// Root key from which every object key is derived.
#[derive(Clone, Debug)]
pub struct MasterKey(KeyBytes);

impl MasterKey {
    /// Load a master key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(KeyBytes(buf)))
    }

    /// Draw a master key from the OS CSPRNG.
    pub fn random() -> Self {
        let mut buf = Box::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut buf[..]);
        Self(KeyBytes(buf))
    }

    /// Derive the key for `object_id` as `HMAC-SHA256(master, object_id)`.
    pub fn derive(&self, object_id: &str) -> Result<KeyBytes, KeyError> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(self.0.expose())
            .map_err(|_| KeyError::Derivation)?;
        mac.update(object_id.as_bytes());
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&mac.finalize().into_bytes());
        Ok(KeyBytes(buf))
    }
}
