//! Shared client/credential pair that encrypted columns are built from.

use std::{fmt, sync::Arc};

use crate::adapter::EncryptedType;
use crate::client::{AccessToken, EncryptionClient};
use crate::underlying::UnderlyingType;

/// Client and credential shared by every encrypted column of an application.
///
/// Build one at startup and hand it to whatever defines the columns. It is
/// immutable; use [`EncryptedType::with_credential`] for a column that needs
/// a different credential.
#[derive(Clone)]
pub struct EncryptionContext {
    client: Arc<dyn EncryptionClient>,
    credential: Option<AccessToken>,
}

impl EncryptionContext {
    /// Create a context with no access credential.
    pub fn new(client: Arc<dyn EncryptionClient>) -> Self {
        Self {
            client,
            credential: None,
        }
    }

    /// Attach an access credential forwarded on every call.
    pub fn with_credential(mut self, credential: impl Into<AccessToken>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// The shared client.
    pub fn client(&self) -> &Arc<dyn EncryptionClient> {
        &self.client
    }

    /// The shared credential, if any.
    pub fn credential(&self) -> Option<&AccessToken> {
        self.credential.as_ref()
    }

    /// Define an encrypted column of the given underlying type.
    pub fn encrypted_type(&self, underlying: UnderlyingType) -> EncryptedType {
        EncryptedType::new(self.client.clone(), self.credential.clone(), underlying)
    }
}

impl fmt::Debug for EncryptionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionContext")
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
