use async_trait::async_trait;
use anyhow::Context;
use library_db::{DbPool, Migration};
use time::OffsetDateTime;

use super::models::Book;

/// Storage primitives for books, keyed by id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book. Returns the stored row with its id and `created_on`.
    async fn save(&self, book: Book) -> anyhow::Result<Book>;
    /// Replace title and author of a stored book in one statement.
    /// `None` when no row has the book's id; `created_on` is never touched.
    async fn update(&self, book: Book) -> anyhow::Result<Option<Book>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>>;
    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool>;
    async fn find_all(&self) -> anyhow::Result<Vec<Book>>;
    async fn count(&self) -> anyhow::Result<u64>;
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()>;
}

pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_init",
        up: r#"
            CREATE TABLE book (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                title      TEXT NOT NULL CHECK (title <> ''),
                author     TEXT NOT NULL CHECK (author <> ''),
                created_on TEXT NOT NULL
            );
            "#,
    }]
}

/// [`BookRepository`] backed by the `book` table.
#[derive(Clone)]
pub struct SqliteBookRepository {
    pool: DbPool,
}

impl SqliteBookRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for SqliteBookRepository {
    async fn save(&self, book: Book) -> anyhow::Result<Book> {
        if let Some(id) = book.id {
            anyhow::bail!("book {id} is already stored, update it instead");
        }
        let created_on = book.created_on.unwrap_or_else(OffsetDateTime::now_utc);

        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO book (title, author, created_on)
            VALUES (?, ?, ?)
            RETURNING id, title, author, created_on
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(created_on)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert book")
    }

    async fn update(&self, book: Book) -> anyhow::Result<Option<Book>> {
        let id = book.id.context("cannot update a book without id")?;

        sqlx::query_as::<_, Book>(
            r#"
            UPDATE book SET title = ?, author = ?
            WHERE id = ?
            RETURNING id, title, author, created_on
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update book {id}"))
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<Book>> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, created_on FROM book WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load book {id}"))
    }

    async fn exists_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let (exists,): (i64,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM book WHERE id = ?)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .with_context(|| format!("failed to check book {id}"))?;
        Ok(exists != 0)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Book>> {
        sqlx::query_as::<_, Book>("SELECT id, title, author, created_on FROM book")
            .fetch_all(&self.pool)
            .await
            .context("failed to list books")
    }

    async fn count(&self) -> anyhow::Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM book")
            .fetch_one(&self.pool)
            .await
            .context("failed to count books")?;
        u64::try_from(count).context("negative book count")
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete book {id}"))?;
        Ok(())
    }
}
