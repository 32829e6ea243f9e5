use database::DatabaseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product with id #{0} not found.")]
    NotFound(i32),

    #[error("Error updating product")]
    UpdateFailed {
        id: i32,
        #[source]
        cause: DatabaseError,
    },

    #[error("Error deleting product")]
    DeleteFailed {
        id: i32,
        #[source]
        cause: DatabaseError,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<validator::ValidationErrors> for ProductError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ProductError::Validation(errors.to_string())
    }
}

/// Error object sent back to the caller of a command
///
/// Serialises as `{"status": 404, "message": "..."}`; `status` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct RpcError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl RpcError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(400, message)
    }
}

/// Translate a domain failure into what the caller sees
///
/// Update/delete failures keep only their fixed message; the storage cause stays server-side.
impl From<ProductError> for RpcError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => RpcError::with_status(404, err.to_string()),
            ProductError::UpdateFailed { .. } | ProductError::DeleteFailed { .. } => {
                RpcError::new(err.to_string())
            }
            ProductError::Validation(msg) => RpcError::bad_request(msg),
            ProductError::Storage(_) => {
                RpcError::with_status(500, "Internal server error")
            }
        }
    }
}
