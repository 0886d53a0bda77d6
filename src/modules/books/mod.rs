pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use library_kernel::{DbPool, InitCtx, Migration, Module};
use serde_json::json;
use std::sync::Arc;

use models::BookRequest;
use repository::SqliteBookRepository;
use service::{BookService, BookServiceImpl};

/// Books module: CRUD over the library catalogue
pub struct BooksModule;

impl BooksModule {
    pub const fn new() -> Self {
        Self
    }

    fn service(db: &DbPool) -> Arc<dyn BookService> {
        let repository = Arc::new(SqliteBookRepository::new(db.clone()));
        Arc::new(BookServiceImpl::new(repository))
    }
}

impl Default for BooksModule {
    fn default() -> Self {
        Self::new()
    }
}

/// Inserts the sample book when the catalogue is empty. Returns whether it did.
pub async fn seed_sample(service: &dyn BookService) -> anyhow::Result<bool> {
    if service.count().await? > 0 {
        return Ok(false);
    }
    service
        .save(Some(BookRequest::new("first Book", "Bushy Given")))
        .await?;
    Ok(true)
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self, ctx: &InitCtx<'_>) -> Router {
        routes::router(Self::service(ctx.db))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        repository::migrations()
    }

    async fn start(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if ctx.settings.seed.enabled {
            let service = Self::service(ctx.db);
            if seed_sample(service.as_ref()).await? {
                tracing::info!(module = self.name(), "sample book inserted");
            }
        }
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn error_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> serde_json::Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookResponse" }
            }
        }
    })
}

fn id_parameter(location: &str) -> serde_json::Value {
    json!({
        "name": "id",
        "in": location,
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

fn book_request_body() -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookRequest" }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    json!({
        "paths": {
            "/add": {
                "post": {
                    "summary": "save books given book request",
                    "tags": ["BOOKS"],
                    "requestBody": book_request_body(),
                    "responses": {
                        "201": book_response("Book created"),
                        "400": error_response("Invalid or malformed request")
                    }
                }
            },
            "/update": {
                "put": {
                    "summary": "update books given book request",
                    "tags": ["BOOKS"],
                    "parameters": [id_parameter("query")],
                    "requestBody": book_request_body(),
                    "responses": {
                        "200": book_response("Book updated"),
                        "400": error_response("Invalid or malformed request"),
                        "404": error_response("Book not found")
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "find book for a given id",
                    "tags": ["BOOKS"],
                    "parameters": [id_parameter("path")],
                    "responses": {
                        "200": book_response("Book"),
                        "404": error_response("Book not found")
                    }
                }
            },
            "/exists/{id}": {
                "get": {
                    "summary": "given an id this operation checks if the book exists",
                    "tags": ["BOOKS"],
                    "parameters": [id_parameter("path")],
                    "responses": {
                        "200": {
                            "description": "Whether the book exists",
                            "content": { "application/json": { "schema": { "type": "boolean" } } }
                        }
                    }
                }
            },
            "/all": {
                "get": {
                    "summary": "finds all the books in the library",
                    "tags": ["BOOKS"],
                    "responses": {
                        "200": {
                            "description": "Books, newest first",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/BookResponse" }
                                    }
                                }
                            }
                        },
                        "404": error_response("No books in the library")
                    }
                }
            },
            "/count": {
                "get": {
                    "summary": "count books in the library",
                    "tags": ["BOOKS"],
                    "responses": {
                        "200": {
                            "description": "Number of books",
                            "content": {
                                "application/json": {
                                    "schema": { "type": "integer", "format": "int64" }
                                }
                            }
                        }
                    }
                }
            },
            "/delete/{id}": {
                "delete": {
                    "summary": "delete a book for a given id",
                    "tags": ["BOOKS"],
                    "parameters": [id_parameter("path")],
                    "responses": {
                        "204": { "description": "Book deleted" },
                        "404": error_response("Book not found")
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Books health check",
                    "tags": ["BOOKS"],
                    "responses": {
                        "200": {
                            "description": "OK",
                            "content": { "text/plain": { "schema": { "type": "string" } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "BookRequest": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "description": "Title of the book" },
                        "author": { "type": "string", "description": "Author of the book" }
                    },
                    "required": ["title", "author"]
                },
                "BookResponse": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "createdOn": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "title", "author", "createdOn"]
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(BooksModule::new())
}
