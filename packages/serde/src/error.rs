//! Error type for the serde bridge.

use typecats_core::{StructureError, UnstructureError};

/// Errors from moving data between serde types and typed records.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Unstructure(#[from] UnstructureError),

    /// The untyped tree did not fit the requested Rust type.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A Rust value could not be serialized into a tree.
    #[error("encode error: {message}")]
    Encode { message: String },
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode {
            message: message.into(),
        }
    }
}
