use library_http::AppError;
use thiserror::Error;

/// Failures surfaced by [`super::service::BookService`].
#[derive(Error, Debug)]
pub enum BookError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl BookError {
    pub fn not_found_id(id: i64) -> Self {
        Self::NotFound(format!("book not found with id: {id}"))
    }
}

impl From<BookError> for AppError {
    fn from(error: BookError) -> Self {
        match error {
            BookError::Validation(message) => AppError::validation(message),
            BookError::NotFound(message) => AppError::not_found(message),
            BookError::Storage(e) => AppError::Internal(e),
        }
    }
}
