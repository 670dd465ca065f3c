//! Error types for declaring, structuring, and unstructuring records.

use typecats_value::{Path, PathError};

use crate::types::AnnotationError;

/// A record declaration or hook registration was malformed.
///
/// Raised once, at declaration time. These indicate a programming error in
/// the host application and are not meant to be recovered from.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeclarationError {
    #[error("invalid name: {0}")]
    InvalidName(#[from] PathError),

    #[error("record type '{record}' declares field '{field}' more than once")]
    DuplicateField { record: String, field: String },

    #[error("a type named '{name}' is already registered")]
    DuplicateType { name: String },

    #[error("field '{field}' of '{record}': {source}")]
    Annotation {
        record: String,
        field: String,
        #[source]
        source: AnnotationError,
    },

    #[error("field '{field}' of '{record}' refers to unknown type '{name}'")]
    UnknownType {
        record: String,
        field: String,
        name: String,
    },

    #[error("field '{field}' of '{record}': mapping keys must be str, found {key}")]
    UnsupportedKey {
        record: String,
        field: String,
        key: String,
    },

    #[error("field '{field}' of '{record}' refers to '{record}' itself")]
    Cycle { record: String, field: String },

    #[error("default for field '{field}' of '{record}' does not match its type: {source}")]
    IncompatibleDefault {
        record: String,
        field: String,
        #[source]
        source: Box<StructureError>,
    },
}

/// A non-empty check failed on a required field.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field '{field}' is required and must not be empty")]
    Empty { field: String },

    #[error("field '{field}' is required but no value was given")]
    Missing { field: String },
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Empty { field } | ValidationError::Missing { field } => field,
        }
    }
}

/// Untyped input did not conform to the declared type.
///
/// Every variant carries the path of the offending value, relative to the
/// top-level input. No partially-built instance ever escapes a failed call.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StructureError {
    #[error("{path}: missing required field '{field}' of {record}")]
    MissingField {
        path: Path,
        record: String,
        field: String,
    },

    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: Path,
        expected: String,
        found: String,
    },

    #[error("{path}: {source}")]
    Invalid {
        path: Path,
        #[source]
        source: ValidationError,
    },

    #[error("{path}: no structure function registered for '{type_name}'")]
    Unregistered { path: Path, type_name: String },

    #[error("{path}: '{type_name}' hook failed: {message}")]
    Hook {
        path: Path,
        type_name: String,
        message: String,
    },

    #[error("{path}: {record} has no field '{field}'")]
    UnknownField {
        path: Path,
        record: String,
        field: String,
    },
}

impl StructureError {
    /// Where in the input the failure happened.
    pub fn path(&self) -> &Path {
        match self {
            StructureError::MissingField { path, .. }
            | StructureError::TypeMismatch { path, .. }
            | StructureError::Invalid { path, .. }
            | StructureError::Unregistered { path, .. }
            | StructureError::Hook { path, .. }
            | StructureError::UnknownField { path, .. } => path,
        }
    }

    /// The failed non-empty check, if that is what this error is.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            StructureError::Invalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A typed value could not be turned back into untyped data.
///
/// Only custom hook values can fail; a record built from registered types
/// always unstructures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UnstructureError {
    #[error("no unstructure function registered for '{type_name}'")]
    Unregistered { type_name: String },

    #[error("'{type_name}' hook failed to unstructure: {message}")]
    Hook { type_name: String, message: String },
}
