//! # Store Error Handling
//!
//! Errors raised by store reads and writes. Every error stops the current
//! operation; nothing is retried or recovered internally.

use std::fmt;
use thiserror::Error;

use crate::path::PATH_SEPARATOR;

/// The kind of access that was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    /// Descending through an ancestor during a deep write.
    ReadOrWrite,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::Write => f.write_str("write"),
            Access::ReadOrWrite => f.write_str("read or write"),
        }
    }
}

/// Error type for store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A path segment lacks the permission the operation needs
    #[error("Not allowed to {access} \"{key}\" (full path \"{path}\")")]
    PermissionDenied {
        access: Access,
        key: String,
        path: String,
    },

    /// A stored or supplied value is not a supported kind
    #[error("Type compatibility error on \"{key}\": {reason}")]
    TypeCompatibility { key: String, reason: String },
}

impl StoreError {
    pub fn permission_denied(access: Access, key: &str, path: &str) -> Self {
        Self::PermissionDenied {
            access,
            key: key.to_string(),
            path: path.to_string(),
        }
    }

    pub fn type_compatibility<S: Into<String>>(key: &str, reason: S) -> Self {
        Self::TypeCompatibility {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Re-anchors an error raised inside the nested store at `parent_key`
    /// so that its path is relative to the parent.
    #[must_use]
    pub fn within(self, parent_key: &str) -> Self {
        match self {
            Self::PermissionDenied { access, key, path } => Self::PermissionDenied {
                access,
                key,
                path: format!("{}{}{}", parent_key, PATH_SEPARATOR, path),
            },
            other => other,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
