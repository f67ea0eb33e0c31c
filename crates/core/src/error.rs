use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Snippet {id} expired on {expiry}")]
    Expired { id: String, expiry: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => CoreError::NotFound {
                entity: "Snippet",
                id,
            },
            StoreError::Conflict(id) => {
                CoreError::Conflict(format!("Snippet with id {id} already exists"))
            }
            StoreError::Corrupt(msg) => CoreError::InvalidState(msg),
            StoreError::Backend(err) => CoreError::Internal(err.to_string()),
        }
    }
}
