//! [`EncryptedType`]: encrypts column values on bind and decrypts them on read.

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::client::{AccessToken, EncryptionClient};
use crate::error::{Error, Result};
use crate::underlying::{UnderlyingType, Value};
use crate::wire::{self, EncryptedColumnValue, SQL_TYPE};

/// Type decorator for one encrypted column.
///
/// Every non-null value bound or read costs exactly one encryption-service
/// call. Nothing is cached: binding the same plaintext twice encrypts it
/// twice, and the service is free to hand back different object ids.
#[derive(Clone)]
pub struct EncryptedType {
    client: Arc<dyn EncryptionClient>,
    credential: Option<AccessToken>,
    underlying: UnderlyingType,
}

impl EncryptedType {
    /// Create a column type from its client, credential, and underlying type.
    pub fn new(
        client: Arc<dyn EncryptionClient>,
        credential: Option<AccessToken>,
        underlying: UnderlyingType,
    ) -> Self {
        Self {
            client,
            credential,
            underlying,
        }
    }

    /// Create a text column with no credential.
    pub fn text(client: Arc<dyn EncryptionClient>) -> Self {
        Self::new(client, None, UnderlyingType::default())
    }

    /// Replace the credential for this column only.
    pub fn with_credential(mut self, credential: impl Into<AccessToken>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// The logical type values of this column have.
    pub fn underlying(&self) -> &UnderlyingType {
        &self.underlying
    }

    /// The SQL type the column is stored as.
    pub fn sql_type(&self) -> &'static str {
        SQL_TYPE
    }

    /// Render a column definition for `CREATE TABLE`.
    pub fn column_definition(&self, name: &str) -> String {
        format!("{name} {}", self.sql_type())
    }

    /// The client this column talks to.
    pub fn client(&self) -> &Arc<dyn EncryptionClient> {
        &self.client
    }

    /// The credential forwarded with every call, if any.
    pub fn credential(&self) -> Option<&AccessToken> {
        self.credential.as_ref()
    }

    /// Encrypt a value on its way into the database.
    ///
    /// `None` is returned unchanged without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if the value does not fit the
    /// underlying type, [`Error::OutOfRange`] for datetimes RFC 3339 cannot
    /// represent, [`Error::InvalidObjectId`] if the service returns a
    /// malformed id, and [`Error::Client`] if the encrypt call fails.
    pub async fn process_bind_param(
        &self,
        value: Option<&Value>,
    ) -> Result<Option<EncryptedColumnValue>> {
        match value {
            Some(value) => self.encrypt(value).await.map(Some),
            None => Ok(None),
        }
    }

    /// Encrypt a non-null value.
    ///
    /// # Errors
    ///
    /// As [`process_bind_param`](Self::process_bind_param).
    pub async fn bind(&self, value: impl Into<Value>) -> Result<EncryptedColumnValue> {
        self.encrypt(&value.into()).await
    }

    /// Decrypt a stored string on its way out of the database.
    ///
    /// `None` is returned unchanged without contacting the service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] if the underlying type cannot be
    /// read back, [`Error::InvalidWireFormat`] if `stored` is not
    /// `<object id><base64>`, [`Error::Malformed`] if the plaintext does not
    /// parse, and [`Error::Client`] if the decrypt call fails.
    pub async fn process_result_value(&self, stored: Option<&str>) -> Result<Option<Value>> {
        let Some(stored) = stored else {
            return Ok(None);
        };
        self.ensure_readable()?;
        let (object_id, ciphertext) = wire::split(stored)?;
        self.decrypt(object_id, &ciphertext).await.map(Some)
    }

    /// Decrypt a value already decoded by sqlx as [`EncryptedColumnValue`].
    ///
    /// # Errors
    ///
    /// As [`process_result_value`](Self::process_result_value).
    pub async fn process_result_column(
        &self,
        stored: Option<&EncryptedColumnValue>,
    ) -> Result<Option<Value>> {
        let Some(stored) = stored else {
            return Ok(None);
        };
        self.ensure_readable()?;
        let ciphertext = stored.ciphertext()?;
        self.decrypt(stored.object_id(), &ciphertext).await.map(Some)
    }

    async fn encrypt(&self, value: &Value) -> Result<EncryptedColumnValue> {
        let plaintext = self.underlying.serialize(value)?;
        let response = self
            .client
            .encrypt(&plaintext, self.credential.as_ref().map(AccessToken::expose))
            .await?;
        let stored = EncryptedColumnValue::new(&response.object_id, &response.ciphertext)?;
        debug!(
            underlying = %self.underlying,
            object_id = %response.object_id,
            "encrypted column value"
        );
        Ok(stored)
    }

    async fn decrypt(&self, object_id: &str, ciphertext: &[u8]) -> Result<Value> {
        let response = self
            .client
            .decrypt(
                ciphertext,
                object_id,
                self.credential.as_ref().map(AccessToken::expose),
            )
            .await?;
        debug!(underlying = %self.underlying, object_id, "decrypted column value");
        self.underlying.deserialize(&response.plaintext)
    }

    fn ensure_readable(&self) -> Result<()> {
        if self.underlying.can_deserialize() {
            Ok(())
        } else {
            Err(Error::UnrecognizedType(self.underlying.name().to_owned()))
        }
    }
}

impl fmt::Debug for EncryptedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedType")
            .field("underlying", &self.underlying)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
