//! HTTP handlers for the Books module.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use library_http::AppError;

use super::models::{BookRequest, BookResponse};
use super::service::BookService;

pub type SharedBookService = Arc<dyn BookService>;

#[derive(Debug, Deserialize)]
struct IdParam {
    id: i64,
}

/// Book routes, relative to the module mount point.
pub fn router(service: SharedBookService) -> Router {
    Router::new()
        .route("/add", post(save))
        .route("/update", put(update))
        .route("/all", get(find_all))
        .route("/count", get(count))
        .route("/health", get(health_check))
        .route("/exists/{id}", get(exists_by_id))
        .route("/delete/{id}", delete(delete_by_id))
        .route("/{id}", get(find_by_id))
        .with_state(service)
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn save(
    State(service): State<SharedBookService>,
    body: Result<Json<Option<BookRequest>>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), AppError> {
    let Json(request) = body?;
    let response = service.save(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update(
    State(service): State<SharedBookService>,
    params: Result<Query<IdParam>, QueryRejection>,
    body: Result<Json<Option<BookRequest>>, JsonRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Query(IdParam { id }) = params?;
    let Json(request) = body?;
    Ok(Json(service.update(request, id).await?))
}

async fn find_by_id(
    State(service): State<SharedBookService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<BookResponse>, AppError> {
    let Path(id) = id?;
    Ok(Json(service.find_by_id(id).await?))
}

async fn exists_by_id(
    State(service): State<SharedBookService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<bool>, AppError> {
    let Path(id) = id?;
    Ok(Json(service.exists_by_id(id).await?))
}

async fn find_all(
    State(service): State<SharedBookService>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    Ok(Json(service.find_all().await?))
}

async fn count(State(service): State<SharedBookService>) -> Result<Json<u64>, AppError> {
    Ok(Json(service.count().await?))
}

async fn delete_by_id(
    State(service): State<SharedBookService>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    service.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
