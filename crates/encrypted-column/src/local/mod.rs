//! In-process loopback implementation of [`EncryptionClient`].
//!
//! Intended for development, demos, and tests that need real ciphertext
//! without a running encryption service. It does no key management, rotation,
//! or session handling.
//!
//! # Scheme
//!
//! ```text
//! object_id  = UUID v4, fresh per encrypt call
//! object_key = HMAC-SHA256(master_key, object_id)
//! ciphertext = nonce || AES-256-GCM-SIV(object_key, nonce, plaintext, aad = object_id)
//! ```

pub mod cipher;
pub mod key;

pub use key::{KeyError, MasterKey};

use async_trait::async_trait;
use common::{ClientError, DecryptResponse, EncryptResponse};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::{AccessToken, EncryptionClient};

/// Loopback encryption client holding its master key in memory.
#[derive(Clone, Debug)]
pub struct LocalClient {
    master: MasterKey,
    expected_credential: Option<AccessToken>,
}

impl LocalClient {
    /// Create a client that accepts calls with or without a credential.
    pub fn new(master: MasterKey) -> Self {
        Self {
            master,
            expected_credential: None,
        }
    }

    /// Create a client with a freshly generated master key.
    pub fn random() -> Self {
        Self::new(MasterKey::random())
    }

    /// Reject every call whose credential does not equal `credential`.
    pub fn require_credential(mut self, credential: impl Into<AccessToken>) -> Self {
        self.expected_credential = Some(credential.into());
        self
    }

    fn authorize(&self, credential: Option<&str>) -> Result<(), ClientError> {
        match (&self.expected_credential, credential) {
            (None, _) => Ok(()),
            (Some(expected), Some(given)) if expected.expose() == given => Ok(()),
            (Some(_), None) => Err(ClientError::Unauthorized("missing access token".into())),
            (Some(_), Some(_)) => Err(ClientError::Unauthorized("invalid access token".into())),
        }
    }
}

#[async_trait]
impl EncryptionClient for LocalClient {
    async fn encrypt(
        &self,
        plaintext: &[u8],
        credential: Option<&str>,
    ) -> Result<EncryptResponse, ClientError> {
        self.authorize(credential)?;

        let object_id = Uuid::new_v4().to_string();
        let key = self
            .master
            .derive(&object_id)
            .map_err(|e| ClientError::Internal(e.to_string()))?;
        let sealed = cipher::seal(key.expose(), plaintext, object_id.as_bytes())
            .map_err(|e| ClientError::EncryptionFailure(e.to_string()))?;

        debug!(object_id = %object_id, "local encrypt");
        Ok(EncryptResponse::new(object_id, sealed))
    }

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        object_id: &str,
        credential: Option<&str>,
    ) -> Result<DecryptResponse, ClientError> {
        self.authorize(credential)?;

        let key = self
            .master
            .derive(object_id)
            .map_err(|e| ClientError::Internal(e.to_string()))?;
        let plaintext = cipher::open(key.expose(), ciphertext, object_id.as_bytes()).map_err(|e| {
            warn!(object_id, error = %e, "local decrypt failed");
            ClientError::DecryptionFailure(e.to_string())
        })?;

        Ok(DecryptResponse::new(plaintext))
    }
}
