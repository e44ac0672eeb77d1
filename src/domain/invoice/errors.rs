use thiserror::Error;
use uuid::Uuid;

use super::value_objects::ValueObjectError;

#[derive(Debug, Error)]
pub enum InvoiceError {
  /// A stored row holds a value the domain does not accept.
  #[error("Invalid stored value: {0}")]
  InvalidValue(#[from] ValueObjectError),

  #[error("Invoice not found: {0}")]
  InvoiceNotFound(Uuid),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Failure of a page cache backend. Never fatal for an action.
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("Cache backend error: {0}")]
  Backend(String),
}

impl From<redis::RedisError> for CacheError {
  fn from(error: redis::RedisError) -> Self {
    CacheError::Backend(error.to_string())
  }
}
