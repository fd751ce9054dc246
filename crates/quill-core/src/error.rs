//! Service-level error type.

use thiserror::Error;
use uuid::Uuid;

use crate::index::IndexError;
use crate::storage::StorageError;

/// Errors surfaced by [`crate::service::ArticleService`].
///
/// Index failures during create/update/delete are deliberately absent:
/// they are logged and never fail the triggering mutation. The `Index`
/// variant exists only for the explicit rebuild operation.
#[derive(Error, Debug)]
pub enum QuillError {
    /// Caller-supplied data violates a precondition. No partial write
    /// has occurred.
    #[error("validation error: {0}")]
    Validation(String),

    /// The referenced article does not exist.
    #[error("article not found: {0}")]
    NotFound(Uuid),

    /// The storage layer could not complete the operation.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An explicit index rebuild failed.
    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type QuillResult<T> = Result<T, QuillError>;
