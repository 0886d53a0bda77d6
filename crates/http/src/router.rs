//! Router builder for the library HTTP server

use axum::{
    http::{HeaderValue, Request},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use uuid::{Timestamp, Uuid};

use library_kernel::ModuleRegistry;

use crate::error::{render_bare_errors, route_not_found};

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
    base_path: String,
}

impl RouterBuilder {
    /// Create a new router builder mounting modules at the root
    pub fn new() -> Self {
        Self::with_base_path("")
    }

    /// Create a router builder mounting modules under `base_path`
    /// (already normalized, e.g. `""` or `/library-api`)
    pub fn with_base_path(base_path: impl Into<String>) -> Self {
        Self {
            router: Router::new(),
            base_path: base_path.into(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    fn module_path(&self, module_name: &str) -> String {
        format!("{}/{}", self.base_path, module_name)
    }

    /// Mount a module's router under `{base_path}/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        let path = self.module_path(module_name);
        self.router = self.router.nest(&path, module_router);
        self
    }

    /// Answer unmatched paths with a JSON 404
    pub fn with_fallback(mut self) -> Self {
        self.router = self.router.fallback(route_not_found);
        self
    }

    /// Render bodiless error responses (405, 408, ...) as JSON error bodies.
    /// Must be the outermost layer to see responses from the other layers.
    pub fn with_error_bodies(mut self) -> Self {
        self.router = self.router.layer(middleware::map_response(render_bare_errors));
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back in `x-request-id`
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Add OpenAPI documentation by collecting specs from all modules
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let openapi_spec = self.merged_openapi(registry);

        let openapi_obj: utoipa::openapi::OpenApi = serde_json::from_value(openapi_spec.clone())
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "merged OpenAPI document is invalid, serving a stub");
                utoipa::openapi::OpenApiBuilder::new()
                    .info(
                        utoipa::openapi::InfoBuilder::new()
                            .title("Library API")
                            .version("v1.0")
                            .build(),
                    )
                    .build()
            });

        self.router = self.router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi_obj),
        );

        // Raw JSON for external consumers
        self.router = self.router.route(
            "/docs/openapi.json",
            get(move || async move { axum::Json(openapi_spec.clone()) }),
        );

        self
    }

    fn merged_openapi(&self, registry: &ModuleRegistry) -> serde_json::Value {
        let mut openapi_spec = serde_json::json!({
            "openapi": "3.1.0",
            "info": {
                "title": "Library API",
                "version": "v1.0",
                "description": "Book catalogue CRUD service"
            },
            "paths": {},
            "components": {
                "schemas": {}
            }
        });

        openapi_spec["components"]["schemas"]["ErrorResponse"] = serde_json::json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "example": "NOT_FOUND" },
                "timestamp": { "type": "string", "example": "16-10-2026 09:30:00" },
                "message": { "type": "string" },
                "debugMessage": { "type": "string" }
            },
            "required": ["status", "timestamp", "message", "debugMessage"]
        });

        openapi_spec["paths"]["/healthz"] = serde_json::json!({
            "get": {
                "summary": "Health check",
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": { "text/plain": { "schema": { "type": "string" } } }
                    }
                }
            }
        });

        for module in registry.modules() {
            let Some(module_spec) = module.openapi() else {
                continue;
            };

            if let Some(paths) = module_spec.get("paths").and_then(|p| p.as_object()) {
                let prefix = self.module_path(module.name());
                for (path, path_item) in paths {
                    let full_path = format!("{prefix}{path}");
                    openapi_spec["paths"][full_path] = path_item.clone();
                }
            }

            if let Some(schemas) = module_spec
                .get("components")
                .and_then(|c| c.get("schemas"))
                .and_then(|s| s.as_object())
            {
                for (schema_name, schema_def) in schemas {
                    openapi_spec["components"]["schemas"][schema_name] = schema_def.clone();
                }
            }
        }

        openapi_spec
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Time-ordered request ids
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::StatusCode};
    use library_kernel::Module;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct ShelvesModule;

    #[async_trait]
    impl Module for ShelvesModule {
        fn name(&self) -> &'static str {
            "shelves"
        }

        fn openapi(&self) -> Option<serde_json::Value> {
            Some(serde_json::json!({
                "paths": { "/all": { "get": { "responses": { "200": { "description": "OK" } } } } },
                "components": { "schemas": { "Shelf": { "type": "object" } } }
            }))
        }
    }

    async fn get_status(router: Router, uri: &str) -> (StatusCode, Option<HeaderValue>) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        (
            response.status(),
            response.headers().get("x-request-id").cloned(),
        )
    }

    #[tokio::test]
    async fn test_module_mounting_under_base_path() {
        let module_router = Router::new().route("/all", get(|| async { "shelves" }));

        let router = RouterBuilder::with_base_path("/library-api")
            .mount_module("shelves", module_router)
            .build();

        let (status, _) = get_status(router.clone(), "/library-api/shelves/all").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get_status(router, "/shelves/all").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_middleware_chain_sets_request_id() {
        let router = RouterBuilder::new()
            .route("/healthz", get(|| async { "ok" }))
            .with_tracing()
            .with_cors()
            .with_request_id()
            .with_timeout(5000)
            .build();

        let (status, request_id) = get_status(router, "/healthz").await;
        assert_eq!(status, StatusCode::OK);
        let request_id = request_id.expect("x-request-id header");
        assert!(Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
    }

    async fn error_body(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method_return_json_errors() {
        let module_router = Router::new().route("/all", get(|| async { "shelves" }));
        let router = RouterBuilder::new()
            .mount_module("shelves", module_router)
            .with_fallback()
            .with_error_bodies()
            .build();

        let (status, body) = error_body(
            router.clone(),
            Request::get("/nowhere").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "NOT_FOUND");
        assert_eq!(body["debugMessage"], "no route for GET /nowhere");

        let (status, body) = error_body(
            router,
            Request::post("/shelves/all").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["status"], "METHOD_NOT_ALLOWED");
    }

    #[tokio::test]
    async fn test_timeout_returns_json_error() {
        let router = RouterBuilder::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .with_timeout(10)
            .with_error_bodies()
            .build();

        let (status, body) =
            error_body(router, Request::get("/slow").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["status"], "REQUEST_TIMEOUT");
        assert_eq!(body["message"], "an error occurred");
    }

    #[test]
    fn test_openapi_merges_module_paths_with_prefix() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(ShelvesModule));

        let spec = RouterBuilder::with_base_path("/library-api").merged_openapi(&registry);
        assert!(spec["paths"]["/library-api/shelves/all"].is_object());
        assert!(spec["paths"]["/healthz"].is_object());
        assert!(spec["components"]["schemas"]["Shelf"].is_object());
        assert!(spec["components"]["schemas"]["ErrorResponse"].is_object());
    }
}
