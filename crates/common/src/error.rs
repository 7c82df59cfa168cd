//! Errors returned by encryption-service clients.

use thiserror::Error;

/// Failure reported by an encryption-service client.
///
/// The adapter never inspects or rewrites these; they reach the caller exactly
/// as the client produced them. Client implementations map their transport
/// errors onto the closest variant:
/// - [`ClientError::Unavailable`] → network or service outage
/// - [`ClientError::Unauthorized`] → missing, expired, or rejected credential
/// - [`ClientError::EncryptionFailure`] / [`ClientError::DecryptionFailure`] → crypto layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The service could not be reached or is temporarily unavailable.
    #[error("encryption service unavailable: {0}")]
    Unavailable(String),

    /// The access credential was missing or rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The service failed to encrypt the plaintext.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// The ciphertext could not be decrypted (wrong object id, tampering, revoked key).
    #[error("decryption failure: {0}")]
    DecryptionFailure(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Returns `true` if retrying the same call later could succeed.
    ///
    /// The adapter itself never retries; this is for callers that wrap a
    /// transaction in their own retry policy.
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Unavailable(_))
    }
}
