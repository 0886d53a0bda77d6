//! Validation and orchestration of book CRUD on top of a [`BookRepository`].

use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::Arc;

use super::error::BookError;
use super::models::{Book, BookRequest, BookResponse};
use super::repository::BookRepository;

pub type BookResult<T> = Result<T, BookError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookService: Send + Sync {
    /// Validate and persist a new book.
    async fn save(&self, request: Option<BookRequest>) -> BookResult<BookResponse>;

    /// Replace title and author of an existing book.
    async fn update(&self, request: Option<BookRequest>, id: i64) -> BookResult<BookResponse>;

    async fn find_by_id(&self, id: i64) -> BookResult<BookResponse>;

    async fn exists_by_id(&self, id: i64) -> BookResult<bool>;

    /// All books, newest first, ties broken by title descending.
    /// An empty catalogue is reported as [`BookError::NotFound`].
    async fn find_all(&self) -> BookResult<Vec<BookResponse>>;

    async fn count(&self) -> BookResult<u64>;

    async fn delete_by_id(&self, id: i64) -> BookResult<()>;
}

pub struct BookServiceImpl {
    repository: Arc<dyn BookRepository>,
}

impl BookServiceImpl {
    pub fn new(repository: Arc<dyn BookRepository>) -> Self {
        Self { repository }
    }

    async fn ensure_exists(&self, id: i64) -> BookResult<()> {
        if self.repository.exists_by_id(id).await? {
            Ok(())
        } else {
            Err(BookError::not_found_id(id))
        }
    }
}

fn validate_request(request: Option<BookRequest>) -> BookResult<BookRequest> {
    let request =
        request.ok_or_else(|| BookError::Validation("book request cannot be null".to_string()))?;
    if request.author.trim().is_empty() {
        return Err(BookError::Validation("author cannot be empty".to_string()));
    }
    if request.title.trim().is_empty() {
        return Err(BookError::Validation("title cannot be empty".to_string()));
    }
    Ok(request)
}

#[async_trait]
impl BookService for BookServiceImpl {
    async fn save(&self, request: Option<BookRequest>) -> BookResult<BookResponse> {
        tracing::info!(?request, "book_service.save entered");
        let request = validate_request(request)?;

        let saved = self
            .repository
            .save(Book::new(request.title, request.author))
            .await?;
        let response = BookResponse::from(saved);

        tracing::info!(?response, "save success");
        Ok(response)
    }

    async fn update(&self, request: Option<BookRequest>, id: i64) -> BookResult<BookResponse> {
        tracing::info!(?request, id, "book_service.update entered");
        let request = validate_request(request)?;

        let updated = self
            .repository
            .update(Book::new(request.title, request.author).with_id(id))
            .await?
            .ok_or_else(|| BookError::not_found_id(id))?;
        let response = BookResponse::from(updated);

        tracing::info!(?response, "update success");
        Ok(response)
    }

    async fn find_by_id(&self, id: i64) -> BookResult<BookResponse> {
        tracing::info!(id, "book_service.find_by_id entered");
        let book = self.repository.find_by_id(id).await?;
        tracing::info!(?book, "find_by_id completed");

        book.map(BookResponse::from)
            .ok_or_else(|| BookError::not_found_id(id))
    }

    async fn exists_by_id(&self, id: i64) -> BookResult<bool> {
        tracing::info!(id, "book_service.exists_by_id entered");
        let exists = self.repository.exists_by_id(id).await?;
        tracing::info!(exists, "exists_by_id completed");
        Ok(exists)
    }

    async fn find_all(&self) -> BookResult<Vec<BookResponse>> {
        tracing::info!("book_service.find_all entered");
        let mut books: Vec<BookResponse> = self
            .repository
            .find_all()
            .await?
            .into_iter()
            .map(BookResponse::from)
            .collect();

        if books.is_empty() {
            tracing::error!("find_all returned an empty list");
            return Err(BookError::NotFound("books not found".to_string()));
        }

        books.sort_by(|a, b| {
            Reverse((a.created_on, &a.title)).cmp(&Reverse((b.created_on, &b.title)))
        });

        tracing::info!(count = books.len(), "find_all success");
        Ok(books)
    }

    async fn count(&self) -> BookResult<u64> {
        tracing::info!("book_service.count entered");
        let count = self.repository.count().await?;
        tracing::info!(count, "count completed");
        Ok(count)
    }

    async fn delete_by_id(&self, id: i64) -> BookResult<()> {
        tracing::info!(id, "book_service.delete_by_id entered");
        self.ensure_exists(id).await?;
        self.repository.delete_by_id(id).await?;
        tracing::info!(id, "delete_by_id completed");
        Ok(())
    }
}
