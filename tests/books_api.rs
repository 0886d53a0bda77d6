use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use library_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app(settings: &Settings) -> Router {
    let db = library_db::connect("sqlite::memory:", 1).await.unwrap();
    let mut registry = ModuleRegistry::new();
    library_app::modules::register_all(&mut registry);
    registry.migrate(&db).await.unwrap();

    let ctx = InitCtx { settings, db: &db };
    library_http::build_router(&registry, &ctx)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response: Response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

#[tokio::test]
async fn add_count_delete_then_not_found() {
    let app = app(&Settings::default()).await;

    let (status, created) = call(
        &app,
        "POST",
        "/books/add",
        Some(json!({"title": "first Book", "author": "Bushy Given"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "first Book");
    assert_eq!(created["author"], "Bushy Given");
    assert!(created["createdOn"].is_string());
    let id = created["id"].as_i64().unwrap();

    let (status, count) = call(&app, "GET", "/books/count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!(1));

    let (status, _) = call(&app, "DELETE", &format!("/books/delete/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, error) = call(&app, "GET", &format!("/books/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["status"], "NOT_FOUND");

    let (status, exists) = call(&app, "GET", &format!("/books/exists/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exists, json!(false));
}

#[tokio::test]
async fn update_keeps_id_and_created_on() {
    let app = app(&Settings::default()).await;

    let (_, created) = call(
        &app,
        "POST",
        "/books/add",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = call(
        &app,
        "PUT",
        &format!("/books/update?id={id}"),
        Some(json!({"title": "Dune Messiah", "author": "Frank Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Dune Messiah");
    assert_eq!(updated["createdOn"], created["createdOn"]);

    let (status, _) = call(
        &app,
        "PUT",
        "/books/update?id=999",
        Some(json!({"title": "x", "author": "y"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_is_not_found_when_empty_and_sorted_otherwise() {
    let app = app(&Settings::default()).await;

    let (status, _) = call(&app, "GET", "/books/all", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for title in ["Alpha", "Beta", "Gamma"] {
        let (status, _) = call(
            &app,
            "POST",
            "/books/add",
            Some(json!({"title": title, "author": "someone"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, books) = call(&app, "GET", "/books/all", None).await;
    assert_eq!(status, StatusCode::OK);
    let books = books.as_array().unwrap();
    assert_eq!(books.len(), 3);
    // Later inserts have later (or equal) timestamps; equal ones fall back to title.
    assert_eq!(books[0]["title"], "Gamma");
    assert_eq!(books[2]["title"], "Alpha");
}

#[tokio::test]
async fn validation_failures_are_bad_request() {
    let app = app(&Settings::default()).await;

    let (status, error) = call(
        &app,
        "POST",
        "/books/add",
        Some(json!({"title": "first Book", "author": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "an error occurred");
    assert_eq!(error["debugMessage"], "author cannot be empty");

    let (status, _) = call(&app, "POST", "/books/add", Some(Value::Null)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn modules_mount_under_configured_base_path() {
    let mut settings = Settings::default();
    settings.server.base_path = "/library-api".to_string();
    let app = app(&settings).await;

    let (status, count) = call(&app, "GET", "/library-api/books/count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count, json!(0));

    let (status, _) = call(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, spec) = call(&app, "GET", "/docs/openapi.json", None).await;
    assert!(spec["paths"]["/library-api/books/add"].is_object());
}

#[tokio::test]
async fn update_after_delete_does_not_restore_the_book() {
    let app = app(&Settings::default()).await;

    let (_, created) = call(
        &app,
        "POST",
        "/books/add",
        Some(json!({"title": "Dune", "author": "Herbert"})),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let (status, _) = call(&app, "DELETE", &format!("/books/delete/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(
        &app,
        "PUT",
        &format!("/books/update?id={id}"),
        Some(json!({"title": "Dune Messiah", "author": "Herbert"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["debugMessage"], format!("book not found with id: {id}"));

    let (_, count) = call(&app, "GET", "/books/count", None).await;
    assert_eq!(count, json!(0));
}

#[tokio::test]
async fn transport_errors_use_the_error_body() {
    let app = app(&Settings::default()).await;

    let (status, body) = call(&app, "GET", "/books/nothing/here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "NOT_FOUND");

    let (status, body) = call(&app, "PATCH", "/books/all", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], "METHOD_NOT_ALLOWED");

    let request = Request::post("/books/add")
        .body(Body::from(r#"{"title":"t","author":"a"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}
