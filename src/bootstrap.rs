//! Application lifecycle: connect, init, migrate, start, serve, stop.

use anyhow::Context;
use library_kernel::{settings::Settings, DbPool, InitCtx, ModuleRegistry};

use crate::modules;

fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);
    registry
}

async fn connect(settings: &Settings) -> anyhow::Result<DbPool> {
    library_db::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("failed to open database")
}

/// Build the multi-threaded runtime the binaries run on.
///
/// Reads the local UTC offset for error timestamps first, while the process
/// is still single-threaded.
pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    library_http::error::capture_local_offset();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

/// Run the HTTP service until a shutdown signal arrives.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let db = connect(settings).await?;
    let registry = registry();
    let ctx = InitCtx {
        settings,
        db: &db,
    };

    registry.init_modules(&ctx).await?;
    let applied = registry.migrate(&db).await?;
    tracing::info!(applied, "migrations complete");
    registry.start_modules(&ctx).await?;

    let served = library_http::start_server(&registry, &ctx).await;

    registry.stop_modules().await?;
    db.close().await;
    served
}

/// Apply pending migrations and return how many ran.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let db = connect(settings).await?;
    let applied = registry().migrate(&db).await?;
    db.close().await;
    Ok(applied)
}
