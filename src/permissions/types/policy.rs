use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level attached to a single store field.
///
/// The four values form a small lattice: `None` grants nothing, `Read` and
/// `Write` grant one direction each, and `ReadWrite` grants both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "r")]
    Read,
    #[serde(rename = "w")]
    Write,
    #[serde(rename = "rw")]
    ReadWrite,
}

impl Permission {
    /// True for `r` and `rw`.
    #[must_use]
    pub fn is_readable(self) -> bool {
        matches!(self, Permission::Read | Permission::ReadWrite)
    }

    /// True for `w` and `rw`.
    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(self, Permission::Write | Permission::ReadWrite)
    }

    /// The canonical short form used in paths, configs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::None => "none",
            Permission::Read => "r",
            Permission::Write => "w",
            Permission::ReadWrite => "rw",
        }
    }
}

impl Default for Permission {
    fn default() -> Self {
        Permission::ReadWrite
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `none`, `r`, `w`, `rw`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid permission \"{0}\": expected one of none, r, w, rw")]
pub struct ParsePermissionError(pub String);

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Permission::None),
            "r" => Ok(Permission::Read),
            "w" => Ok(Permission::Write),
            "rw" => Ok(Permission::ReadWrite),
            other => Err(ParsePermissionError(other.to_string())),
        }
    }
}

/// Free-function form of [`Permission::is_readable`].
#[must_use]
pub fn is_readable(permission: Permission) -> bool {
    permission.is_readable()
}

/// Free-function form of [`Permission::is_writable`].
#[must_use]
pub fn is_writable(permission: Permission) -> bool {
    permission.is_writable()
}
