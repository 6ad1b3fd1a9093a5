// permissions module

pub mod permission_manager;
pub mod types;
pub use permission_manager::{get_permission, PermissionManager};
pub use types::policy::{is_readable, is_writable, ParsePermissionError, Permission};
