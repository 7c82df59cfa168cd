//! Transparent column encryption for sqlx.
//!
//! [`EncryptedType`] sits between application values and a TEXT column. On
//! bind it serializes the value according to its [`UnderlyingType`], asks an
//! [`EncryptionClient`] to encrypt it, and stores
//! `<36-char object id><base64 ciphertext>`. On read it reverses the steps.
//!
//! ```text
//! Value ──serialize──▶ plaintext ──client.encrypt──▶ (object_id, ciphertext)
//!                                                        │
//!                         EncryptedColumnValue ◀──────────┘  object_id + base64(ciphertext)
//! ```
//!
//! The crate holds no global state: columns are built from an explicit
//! [`EncryptionContext`] or directly from a client.

pub mod adapter;
pub mod client;
pub mod context;
pub mod error;
pub mod local;
pub mod underlying;
pub mod wire;

pub use adapter::EncryptedType;
pub use client::{AccessToken, EncryptionClient};
pub use context::EncryptionContext;
pub use error::{Error, Result};
pub use local::{LocalClient, MasterKey};
pub use underlying::{CustomCodec, UnderlyingType, Value};
pub use wire::{EncryptedColumnValue, SQL_TYPE};

pub use common::{ClientError, DecryptResponse, EncryptResponse, OBJECT_ID_LEN};
