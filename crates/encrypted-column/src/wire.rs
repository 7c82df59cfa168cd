//! The stored representation of an encrypted column.
//!
//! ```text
//! <object id: 36 ASCII bytes><base64(ciphertext), standard alphabet, padded>
//! ```
//!
//! There is no delimiter; the identifier is recovered by length alone.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::OBJECT_ID_LEN;
use sqlx::{
    encode::IsNull,
    error::BoxDynError,
    Database, Decode, Encode, Type,
};

use crate::error::{Error, Result};

/// SQL type encrypted columns are declared with.
pub const SQL_TYPE: &str = "TEXT";

/// A validated `<object id><base64 ciphertext>` string.
///
/// Binds and decodes as the database's text type, so it can be used directly
/// with `sqlx::query(..).bind(..)` and `row.try_get(..)`. Wrap in `Option` for
/// nullable columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncryptedColumnValue(String);

impl EncryptedColumnValue {
    /// Build the stored form from an encrypt response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidObjectId`] if `object_id` is not exactly
    /// [`OBJECT_ID_LEN`] ASCII bytes.
    pub fn new(object_id: &str, ciphertext: &[u8]) -> Result<Self> {
        if object_id.len() != OBJECT_ID_LEN || !object_id.is_ascii() {
            return Err(Error::InvalidObjectId(object_id.len()));
        }
        let mut s = String::with_capacity(OBJECT_ID_LEN + ciphertext.len().div_ceil(3) * 4);
        s.push_str(object_id);
        STANDARD.encode_string(ciphertext, &mut s);
        Ok(Self(s))
    }

    /// Validate a string read back from the database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWireFormat`] if the string is too short, the
    /// prefix is not ASCII, or the remainder is not valid base64.
    pub fn parse(stored: impl Into<String>) -> Result<Self> {
        let stored = stored.into();
        split(&stored)?;
        Ok(Self(stored))
    }

    /// The object identifier prefix.
    pub fn object_id(&self) -> &str {
        &self.0[..OBJECT_ID_LEN]
    }

    /// The base64 ciphertext suffix, still encoded.
    pub fn encoded_ciphertext(&self) -> &str {
        &self.0[OBJECT_ID_LEN..]
    }

    /// Decode the ciphertext suffix.
    pub fn ciphertext(&self) -> Result<Vec<u8>> {
        decode_ciphertext(self.encoded_ciphertext())
    }

    /// The full stored string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the stored string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Split a stored value into its object id and decoded ciphertext.
///
/// # Errors
///
/// Returns [`Error::InvalidWireFormat`] on any layout violation.
pub fn split(stored: &str) -> Result<(&str, Vec<u8>)> {
    if stored.len() < OBJECT_ID_LEN {
        return Err(Error::InvalidWireFormat(format!(
            "value is {} bytes, shorter than the {OBJECT_ID_LEN}-byte object id",
            stored.len()
        )));
    }
    let object_id = stored
        .get(..OBJECT_ID_LEN)
        .filter(|id| id.is_ascii())
        .ok_or_else(|| Error::InvalidWireFormat("object id prefix is not ASCII".into()))?;
    let ciphertext = decode_ciphertext(&stored[OBJECT_ID_LEN..])?;
    Ok((object_id, ciphertext))
}

fn decode_ciphertext(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::InvalidWireFormat(format!("ciphertext is not base64: {e}")))
}

impl fmt::Display for EncryptedColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncryptedColumnValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// sqlx integration
// ---------------------------------------------------------------------------

impl<DB: Database> Type<DB> for EncryptedColumnValue
where
    String: Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <String as Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <String as Type<DB>>::compatible(ty)
    }
}

impl<'q, DB: Database> Encode<'q, DB> for EncryptedColumnValue
where
    String: Encode<'q, DB>,
{
    fn encode_by_ref(
        &self,
        buf: &mut <DB as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        <String as Encode<'q, DB>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r, DB: Database> Decode<'r, DB> for EncryptedColumnValue
where
    String: Decode<'r, DB>,
{
    fn decode(value: <DB as Database>::ValueRef<'r>) -> Result<Self, BoxDynError> {
        let stored = <String as Decode<'r, DB>>::decode(value)?;
        Ok(Self::parse(stored)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OID: &str = "11111111-1111-1111-1111-111111111111";

    #[test]
    fn known_encoding() {
        let v = EncryptedColumnValue::new(OID, b"XYZ").unwrap();
        assert_eq!(v.as_str(), "11111111-1111-1111-1111-111111111111WFla");
        assert_eq!(v.object_id(), OID);
        assert_eq!(v.encoded_ciphertext(), "WFla");
        assert_eq!(v.ciphertext().unwrap(), b"XYZ");
    }

    #[test]
    fn padding_is_kept() {
        let v = EncryptedColumnValue::new(OID, b"XY").unwrap();
        assert_eq!(v.encoded_ciphertext(), "WFk=");
    }

    #[test]
    fn long_ciphertext_has_no_line_breaks() {
        let v = EncryptedColumnValue::new(OID, &[0xAB; 512]).unwrap();
        assert!(!v.as_str().contains('\n'));
        assert_eq!(v.encoded_ciphertext().len(), 684);
    }

    #[test]
    fn empty_ciphertext_is_allowed() {
        let v = EncryptedColumnValue::new(OID, b"").unwrap();
        assert_eq!(v.as_str(), OID);
        assert!(v.ciphertext().unwrap().is_empty());
    }

    #[test]
    fn rejects_short_object_id() {
        let err = EncryptedColumnValue::new("1234", b"XYZ").unwrap_err();
        assert!(matches!(err, Error::InvalidObjectId(4)));
    }

    #[test]
    fn rejects_non_ascii_object_id() {
        // 36 bytes, but multi-byte characters
        let id = "é".repeat(18);
        assert_eq!(id.len(), 36);
        assert!(EncryptedColumnValue::new(&id, b"XYZ").is_err());
    }

    #[test]
    fn parse_accepts_valid() {
        let v = EncryptedColumnValue::parse(format!("{OID}WFla")).unwrap();
        assert_eq!(v.object_id(), OID);
    }

    #[test]
    fn parse_rejects_too_short() {
        let err = EncryptedColumnValue::parse("1111").unwrap_err();
        assert!(matches!(err, Error::InvalidWireFormat(_)));
    }

    #[test]
    fn parse_rejects_bad_base64() {
        let err = EncryptedColumnValue::parse(format!("{OID}!!!")).unwrap_err();
        assert!(matches!(err, Error::InvalidWireFormat(_)));
    }

    #[test]
    fn parse_rejects_multibyte_prefix_boundary() {
        // 35 ASCII bytes then a 2-byte char straddling the 36-byte boundary.
        let stored = format!("{}éWFla", &OID[..35]);
        let err = EncryptedColumnValue::parse(stored).unwrap_err();
        assert!(matches!(err, Error::InvalidWireFormat(_)));
    }

    #[test]
    fn split_returns_parts() {
        let stored = format!("{OID}WFla");
        let (id, ct) = split(&stored).unwrap();
        assert_eq!(id, OID);
        assert_eq!(ct, b"XYZ");
    }
}
