//! Long-lived service containers built once by [`crate::bootstrap`].

pub mod auth;
pub mod collections;
pub mod recyclables;

pub use auth::AuthService;
pub use collections::CollectionService;
pub use recyclables::RecyclablesService;

use serde::{Deserialize, Serialize};

/// Outcome of a user-initiated write, shaped for the UI.
///
/// Serializes as `{ "success": bool, "error"?: string, "data"?: T }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationResult<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<T>,
}

impl<T> MutationResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            data: None,
        }
    }
}

impl MutationResult<()> {
    /// Success with nothing to hand back; serializes as `{ "success": true }`.
    pub fn done() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }
}

impl<T> From<anyhow::Result<T>> for MutationResult<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failed(err.to_string()),
        }
    }
}
