//! The encryption-service seam the adapter depends on.

use std::fmt;

use async_trait::async_trait;
use common::{ClientError, DecryptResponse, EncryptResponse};

/// Client for a remote encryption service.
///
/// The adapter calls each method at most once per bound or read value and
/// never retries. Implementations own transport, timeouts, and credential
/// validation; whatever they return is passed straight to the caller.
#[async_trait]
pub trait EncryptionClient: Send + Sync {
    /// Encrypt `plaintext`, returning the object id and ciphertext.
    async fn encrypt(
        &self,
        plaintext: &[u8],
        credential: Option<&str>,
    ) -> Result<EncryptResponse, ClientError>;

    /// Decrypt `ciphertext` that was produced under `object_id`.
    async fn decrypt(
        &self,
        ciphertext: &[u8],
        object_id: &str,
        credential: Option<&str>,
    ) -> Result<DecryptResponse, ClientError>;
}

/// Access credential forwarded to the encryption service on every call.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token for a client call.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_redacted_in_debug() {
        let t = AccessToken::new("s3cr3t");
        let dbg = format!("{t:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("s3cr3t"));
        assert_eq!(t.expose(), "s3cr3t");
    }
}
