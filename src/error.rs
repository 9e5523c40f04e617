//! Error types for declaration parsing and accessor lookups.

use thiserror::Error;

/// Errors produced while compiling declarations or invoking accessors.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// A declaration element has a shape the grammar does not recognize
    #[error("invalid directive at {path}: {reason}")]
    InvalidDirective { path: String, reason: String },

    /// No accessor with this generated name exists in the set
    #[error("no accessor named `{name}`")]
    UnknownAccessor { name: String },

    /// A leaf operation was invoked on a group accessor, or the reverse
    #[error("accessor `{name}` is a {actual}, expected a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// The host record does not expose the declared root field
    #[error("host record has no root field `{field}`")]
    MissingRootField { field: String },

    /// Loading or dumping the serialized column failed
    #[error("invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidDirective {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error comes from a malformed declaration
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidDirective { .. })
    }

    /// Check if this error comes from looking up an accessor by name
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownAccessor { .. } | Error::KindMismatch { .. }
        )
    }

    /// Get the accessor name if this is a lookup error
    pub fn accessor_name(&self) -> Option<&str> {
        match self {
            Error::UnknownAccessor { name } | Error::KindMismatch { name, .. } => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
