//! HTTP server facade with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Router};

use library_kernel::{InitCtx, ModuleRegistry};

pub mod error;
pub mod router;

pub use error::AppError;
use router::RouterBuilder;

/// Start the HTTP server with the given module registry and serve until a
/// shutdown signal arrives.
pub async fn start_server(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
    let server = &ctx.settings.server;
    tracing::info!("starting HTTP server on {}:{}", server.host, server.port);

    let app = build_router(registry, ctx);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.host, server.port))
        .await
        .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}{}",
        server.host,
        server.port,
        server.normalized_base_path()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, ctx: &InitCtx<'_>) -> Router {
    let server = &ctx.settings.server;
    let mut router_builder = RouterBuilder::with_base_path(server.normalized_base_path())
        .route("/healthz", get(health_check));

    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(module = module_name, "mounting module routes");
        router_builder = router_builder.mount_module(module_name, module.routes(ctx));
    }

    // Layers wrap everything registered above.
    router_builder
        .with_openapi(registry)
        .with_fallback()
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(server.request_timeout_ms)
        .with_error_bodies()
        .build()
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use library_kernel::settings::Settings;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_healthz_and_openapi_are_served() {
        let settings = Settings::default();
        let db = library_db::connect("sqlite::memory:", 1).await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        let router = build_router(&ModuleRegistry::new(), &ctx);

        let response = router
            .clone()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(Request::get("/docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_has_json_error_body() {
        let settings = Settings::default();
        let db = library_db::connect("sqlite::memory:", 1).await.unwrap();
        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        let router = build_router(&ModuleRegistry::new(), &ctx);

        let response = router
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "NOT_FOUND");
        assert_eq!(body["message"], "an error occurred");
    }
}
