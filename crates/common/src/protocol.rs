//! Responses returned by the encryption service's encrypt and decrypt calls.
//!
//! Both are short-lived: the adapter consumes them within a single bind or
//! result operation and never stores them.

use bytes::Bytes;

/// Length in bytes of an object identifier (a hyphenated UUID string).
pub const OBJECT_ID_LEN: usize = 36;

// ---------------------------------------------------------------------------
// Encrypt
// ---------------------------------------------------------------------------

/// Result of a successful encrypt call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptResponse {
    /// Identifier of the key/version context the service used. Required to
    /// decrypt the ciphertext later.
    pub object_id: String,
    /// Opaque ciphertext bytes.
    pub ciphertext: Bytes,
}

impl EncryptResponse {
    /// Construct an [`EncryptResponse`] from an object id and ciphertext.
    pub fn new(object_id: impl Into<String>, ciphertext: impl Into<Bytes>) -> Self {
        Self {
            object_id: object_id.into(),
            ciphertext: ciphertext.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Decrypt
// ---------------------------------------------------------------------------

/// Result of a successful decrypt call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptResponse {
    /// Recovered plaintext bytes.
    pub plaintext: Bytes,
}

impl DecryptResponse {
    /// Construct a [`DecryptResponse`] from plaintext bytes.
    pub fn new(plaintext: impl Into<Bytes>) -> Self {
        Self {
            plaintext: plaintext.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_response_new() {
        let r = EncryptResponse::new("11111111-1111-1111-1111-111111111111", b"XYZ".to_vec());
        assert_eq!(r.object_id.len(), OBJECT_ID_LEN);
        assert_eq!(&r.ciphertext[..], b"XYZ");
    }

    #[test]
    fn decrypt_response_from_static() {
        let r = DecryptResponse::new(Bytes::from_static(b"Jackson"));
        assert_eq!(&r.plaintext[..], b"Jackson");
    }
}
