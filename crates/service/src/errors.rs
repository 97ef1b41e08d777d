use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    /// Update/delete aimed at a record that is not in the store.
    #[error("{0}")]
    DoesNotExist(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn does_not_exist(entity: &str, key: &str, id: &str) -> Self {
        Self::DoesNotExist(format!("{entity} with {key} {id} does not exist."))
    }

    /// Caller input was rejected before touching the store.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Model(ModelError::Validation(_)))
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(e: redis::RedisError) -> Self { Self::Store(e.to_string()) }
}
