//! Protocol types and errors shared between the encrypted column adapter and
//! the encryption-service clients it talks to.

pub mod error;
pub mod protocol;

pub use error::ClientError;
pub use protocol::{DecryptResponse, EncryptResponse, OBJECT_ID_LEN};
