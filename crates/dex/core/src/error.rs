//! Field-level failure type shared by every upstream adapter.
//!
//! A field error describes why one attribute of one record could not be read.
//! It is always recovered where it is produced: the attribute becomes
//! unconstrained and the rest of the record is still normalized.

use thiserror::Error;

/// Why a single attribute could not be read from an upstream record.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The attribute is not present on the record.
    #[error("field `{0}` is missing")]
    Missing(&'static str),

    /// The attribute exists but holds a value of an unexpected shape.
    #[error("field `{field}` expected {expected}, found {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    /// The adapter does not expose this attribute at all.
    #[error("field `{0}` is not exposed by this source")]
    Unsupported(&'static str),

    /// The host raised an error while the attribute was being read.
    #[error("host error while reading `{field}`: {message}")]
    Host { field: &'static str, message: String },
}

impl FieldError {
    /// Name of the attribute that failed.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing(field) | Self::Unsupported(field) => field,
            Self::TypeMismatch { field, .. } | Self::Host { field, .. } => field,
        }
    }
}

/// Result of reading one attribute from an upstream record.
pub type FieldResult<T> = Result<T, FieldError>;
