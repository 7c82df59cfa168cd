//! AES-256-GCM-SIV sealing of plaintext under a per-object key.
//!
//! Sealed layout: `nonce (12 bytes) || ciphertext+tag`. The object id is bound
//! as associated data, so a ciphertext only opens under the id it was sealed
//! with.

use aes_gcm_siv::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng, Payload},
    Aes256GcmSiv, Nonce,
};
use thiserror::Error;

/// Byte length of an AES-256 key.
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce.
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended by the AEAD.
pub const TAG_LEN: usize = 16;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is the wrong length.
    #[error("invalid key length: expected {KEY_LEN} bytes")]
    InvalidKeyLength,

    /// The sealed blob is shorter than a nonce plus tag.
    #[error("sealed value too short: {0} bytes")]
    Truncated(usize),

    /// AEAD encryption or authentication failed.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Seal `plaintext` under `key`, binding `aad`.
///
/// A fresh random nonce is drawn per call, so sealing the same plaintext
/// twice yields different output.
pub fn seal(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CipherError::AeadFailure)?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Open a blob produced by [`seal`] with the same key and `aad`.
pub fn open(key: &[u8], sealed: &[u8], aad: &[u8]) -> Result<Vec<u8>, CipherError> {
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CipherError::Truncated(sealed.len()));
    }
    let cipher = build_cipher(key)?;
    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CipherError::AeadFailure)
}

fn build_cipher(key: &[u8]) -> Result<Aes256GcmSiv, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength);
    }
    Aes256GcmSiv::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_LEN];
        OsRng.fill_bytes(&mut key);
        key
    }

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        let sealed = seal(&key, b"Jackson", b"oid").unwrap();
        assert_eq!(sealed.len(), NONCE_LEN + 7 + TAG_LEN);
        assert_eq!(open(&key, &sealed, b"oid").unwrap(), b"Jackson");
    }

    #[test]
    fn fresh_nonce_each_call() {
        let key = random_key();
        assert_ne!(seal(&key, b"x", b"").unwrap(), seal(&key, b"x", b"").unwrap());
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(&random_key(), b"secret", b"").unwrap();
        assert!(matches!(
            open(&random_key(), &sealed, b""),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn wrong_aad_fails() {
        let key = random_key();
        let sealed = seal(&key, b"secret", b"oid-a").unwrap();
        assert!(open(&key, &sealed, b"oid-b").is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let key = random_key();
        let mut sealed = seal(&key, b"tamper me", b"").unwrap();
        sealed[NONCE_LEN] ^= 0xFF;
        assert!(open(&key, &sealed, b"").is_err());
    }

    #[test]
    fn truncated_input_rejected() {
        let key = random_key();
        assert!(matches!(
            open(&key, &[0u8; 10], b""),
            Err(CipherError::Truncated(10))
        ));
    }

    #[test]
    fn invalid_key_length_rejected() {
        assert!(matches!(
            seal(&[0u8; 16], b"x", b""),
            Err(CipherError::InvalidKeyLength)
        ));
    }
}
