//! Errors raised by the encrypted column adapter.

use common::ClientError;
use thiserror::Error;

/// Errors produced while binding or reading an encrypted column.
///
/// Type-coercion variants are programming errors and should surface in tests.
/// [`Error::Client`] carries the client's failure untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// The value handed to bind has no serialization rule for the column's
    /// underlying type.
    #[error("unsupported type: cannot store a {value} value in a {column} column")]
    UnsupportedType {
        /// Underlying type the column was declared with.
        column: String,
        /// Kind of value that was supplied.
        value: &'static str,
    },

    /// The value has the right kind but cannot be written without loss, such
    /// as a datetime whose year needs more than four digits.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// The column's underlying type has no rule for turning plaintext back
    /// into a value.
    #[error("unrecognized type: no deserialization rule for {0}")]
    UnrecognizedType(String),

    /// A stored value does not follow the `<object id><base64 ciphertext>` layout.
    #[error("invalid wire format: {0}")]
    InvalidWireFormat(String),

    /// The client returned an object id that is not exactly 36 ASCII bytes.
    #[error("invalid object id: expected {} ASCII bytes, got {0}", common::OBJECT_ID_LEN)]
    InvalidObjectId(usize),

    /// Decrypted plaintext does not parse as the column's underlying type.
    #[error("malformed plaintext: {0}")]
    Malformed(String),

    /// The encryption client failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_error_display_is_transparent() {
        let inner = ClientError::Unavailable("connection refused".into());
        let e = Error::from(inner.clone());
        assert_eq!(e.to_string(), inner.to_string());
    }

    #[test]
    fn unsupported_type_names_both_sides() {
        let e = Error::UnsupportedType {
            column: "text".into(),
            value: "integer",
        };
        let msg = e.to_string();
        assert!(msg.contains("text") && msg.contains("integer"), "{msg}");
    }

    #[test]
    fn out_of_range_carries_reason() {
        let e = Error::OutOfRange("year 10000 does not fit RFC 3339".into());
        assert_eq!(e.to_string(), "value out of range: year 10000 does not fit RFC 3339");
    }

    #[test]
    fn invalid_object_id_mentions_expected_length() {
        assert!(Error::InvalidObjectId(8).to_string().contains("36"));
    }
}
