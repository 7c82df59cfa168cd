//! Logical column types and the plaintext serialization rule for each.
//!
//! | underlying | accepted value        | plaintext bytes                 |
//! |------------|-----------------------|---------------------------------|
//! | `Text`     | [`Value::Text`]       | UTF-8                           |
//! | `Bytes`    | [`Value::Bytes`]      | unchanged                       |
//! | `Boolean`  | [`Value::Boolean`]    | `true` / `false`                |
//! | `DateTime` | [`Value::DateTime`]   | RFC 3339 (ISO-8601), UTF-8      |
//! | `Json`     | [`Value::Json`]       | compact JSON, UTF-8             |
//! | `Custom`   | codec-defined         | codec-defined                   |
//!
//! RFC 3339 has four-digit years and minute-precision offsets, so datetimes
//! outside years 0000..=9999 or with a seconds component in their offset are
//! rejected on bind with [`Error::OutOfRange`].

use std::{fmt, sync::Arc};

use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat, Utc};

use crate::error::{Error, Result};

const TRUE_LITERAL: &str = "true";
const FALSE_LITERAL: &str = "false";
const RFC3339_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

fn datetime_to_rfc3339(dt: &DateTime<FixedOffset>) -> Result<Vec<u8>> {
    if !RFC3339_YEARS.contains(&dt.year()) {
        return Err(Error::OutOfRange(format!(
            "year {} does not fit RFC 3339",
            dt.year()
        )));
    }
    let offset = dt.offset().local_minus_utc();
    if offset % 60 != 0 {
        return Err(Error::OutOfRange(format!(
            "utc offset of {offset}s is not a whole minute"
        )));
    }
    Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false).into_bytes())
}

/// An application-side value of an encrypted column.
///
/// SQL NULL is represented by `Option::None` around a `Value`, never by a
/// variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A boolean.
    Boolean(bool),
    /// A timestamp with its UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Any JSON document.
    Json(serde_json::Value),
    /// A signed integer. Only custom codecs accept it.
    Integer(i64),
    /// A float. Only custom codecs accept it.
    Float(f64),
}

impl Value {
    /// Short lowercase name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Boolean(_) => "boolean",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
        }
    }

    /// Borrow the text, if this is [`Value::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the bytes, if this is [`Value::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// The boolean, if this is [`Value::Boolean`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.fixed_offset())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Caller-supplied serialization rule for a [`UnderlyingType::Custom`] column.
///
/// A codec that only writes leaves the `deserialize` pair at its defaults;
/// reads from such a column fail with [`Error::UnrecognizedType`] before the
/// encryption service is contacted. Codecs that read must override both
/// [`can_deserialize`](Self::can_deserialize) and
/// [`deserialize`](Self::deserialize).
pub trait CustomCodec: Send + Sync + fmt::Debug {
    /// Name reported in errors and logs.
    fn name(&self) -> &str;

    /// Turn `value` into plaintext bytes, or reject it with
    /// [`Error::UnsupportedType`].
    fn serialize(&self, value: &Value) -> Result<Vec<u8>>;

    /// Whether this codec can turn plaintext back into a [`Value`].
    fn can_deserialize(&self) -> bool {
        false
    }

    /// Turn decrypted plaintext back into a [`Value`].
    fn deserialize(&self, _plaintext: &[u8]) -> Result<Value> {
        Err(Error::UnrecognizedType(self.name().to_owned()))
    }
}

/// The logical type an encrypted column holds.
///
/// Fixed when the column is defined. Defaults to [`UnderlyingType::Text`].
#[derive(Debug, Clone, Default)]
pub enum UnderlyingType {
    /// UTF-8 text.
    #[default]
    Text,
    /// Raw bytes.
    Bytes,
    /// Booleans stored as the literals `true` / `false`.
    Boolean,
    /// Timestamps stored as RFC 3339 strings.
    DateTime,
    /// JSON documents.
    Json,
    /// A caller-defined rule.
    Custom(Arc<dyn CustomCodec>),
}

impl UnderlyingType {
    /// Wrap a custom codec.
    pub fn custom(codec: impl CustomCodec + 'static) -> Self {
        UnderlyingType::Custom(Arc::new(codec))
    }

    /// Name of the type as used in errors and logs.
    pub fn name(&self) -> &str {
        match self {
            UnderlyingType::Text => "text",
            UnderlyingType::Bytes => "bytes",
            UnderlyingType::Boolean => "boolean",
            UnderlyingType::DateTime => "datetime",
            UnderlyingType::Json => "json",
            UnderlyingType::Custom(codec) => codec.name(),
        }
    }

    /// Whether plaintext read from this column can be turned back into a value.
    pub fn can_deserialize(&self) -> bool {
        match self {
            UnderlyingType::Custom(codec) => codec.can_deserialize(),
            _ => true,
        }
    }

    /// Serialize `value` to the plaintext handed to the encryption service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if `value` has no rule for this type,
    /// and [`Error::OutOfRange`] for datetimes RFC 3339 cannot carry exactly.
    pub fn serialize(&self, value: &Value) -> Result<Vec<u8>> {
        match (self, value) {
            (UnderlyingType::Text, Value::Text(s)) => Ok(s.as_bytes().to_vec()),
            (UnderlyingType::Bytes, Value::Bytes(b)) => Ok(b.clone()),
            (UnderlyingType::Boolean, Value::Boolean(b)) => {
                let literal = if *b { TRUE_LITERAL } else { FALSE_LITERAL };
                Ok(literal.as_bytes().to_vec())
            }
            (UnderlyingType::DateTime, Value::DateTime(dt)) => datetime_to_rfc3339(dt),
            (UnderlyingType::Json, Value::Json(doc)) => Ok(doc.to_string().into_bytes()),
            (UnderlyingType::Custom(codec), value) => codec.serialize(value),
            (column, value) => Err(Error::UnsupportedType {
                column: column.name().to_owned(),
                value: value.kind(),
            }),
        }
    }

    /// Deserialize decrypted plaintext back into a value of this type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedType`] for custom codecs without a read
    /// rule, and [`Error::Malformed`] if the plaintext does not parse.
    pub fn deserialize(&self, plaintext: &[u8]) -> Result<Value> {
        match self {
            UnderlyingType::Text => String::from_utf8(plaintext.to_vec())
                .map(Value::Text)
                .map_err(|e| Error::Malformed(format!("text is not UTF-8: {e}"))),
            UnderlyingType::Bytes => Ok(Value::Bytes(plaintext.to_vec())),
            // Anything other than the exact literal reads back as false.
            UnderlyingType::Boolean => Ok(Value::Boolean(plaintext == TRUE_LITERAL.as_bytes())),
            UnderlyingType::DateTime => {
                let s = std::str::from_utf8(plaintext)
                    .map_err(|e| Error::Malformed(format!("datetime is not UTF-8: {e}")))?;
                DateTime::parse_from_rfc3339(s)
                    .map(Value::DateTime)
                    .map_err(|e| Error::Malformed(format!("datetime is not RFC 3339: {e}")))
            }
            UnderlyingType::Json => serde_json::from_slice(plaintext)
                .map(Value::Json)
                .map_err(|e| Error::Malformed(format!("invalid json: {e}"))),
            UnderlyingType::Custom(codec) if codec.can_deserialize() => codec.deserialize(plaintext),
            UnderlyingType::Custom(codec) => Err(Error::UnrecognizedType(codec.name().to_owned())),
        }
    }
}

impl fmt::Display for UnderlyingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
