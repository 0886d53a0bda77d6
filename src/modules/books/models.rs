use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Persisted book record.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    /// Assigned by storage on first save
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    /// Set by storage on first save and never changed afterwards
    pub created_on: Option<OffsetDateTime>,
}

impl Book {
    /// A book that has not been saved yet.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: author.into(),
            created_on: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Request model for creating or updating a book.
///
/// Missing fields deserialize as empty strings and are rejected by validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
}

impl BookRequest {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

/// Projection of a [`Book`] returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_on: Option<OffsetDateTime>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            created_on: book.created_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn response_uses_camel_case_and_rfc3339() {
        let response = BookResponse::from(Book {
            id: Some(1),
            title: "first Book".to_string(),
            author: "Bushy Given".to_string(),
            created_on: Some(datetime!(2024-01-02 03:04:05 UTC)),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "first Book");
        assert_eq!(json["author"], "Bushy Given");
        assert_eq!(json["createdOn"], "2024-01-02T03:04:05Z");
    }

    #[test]
    fn request_tolerates_missing_fields() {
        let request: BookRequest = serde_json::from_str(r#"{"title":"only a title"}"#).unwrap();
        assert_eq!(request.title, "only a title");
        assert_eq!(request.author, "");
    }
}
