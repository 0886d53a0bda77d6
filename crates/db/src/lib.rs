//! SQLite pool factory and migration tooling.

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use time::OffsetDateTime;

/// Connection pool handed to modules.
pub type DbPool = SqlitePool;

/// Migration definition for modules
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

const MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL,
        PRIMARY KEY (module, id)
    )
"#;

/// Open a SQLite pool for `url`, creating the database file if needed.
///
/// In-memory databases are private to a connection, so `sqlite::memory:` urls
/// are always opened with a single connection.
pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<DbPool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database url '{url}'"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = url.contains(":memory:");
    let max_connections = if in_memory { 1 } else { max_connections.max(1) };

    let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections);
    if in_memory {
        // Recycling the only connection would drop the database with it.
        pool_options = pool_options.idle_timeout(None).max_lifetime(None);
    }

    let pool = pool_options
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database '{url}'"))?;

    tracing::info!(target: "library-db", %url, max_connections, "database pool ready");
    Ok(pool)
}

/// Apply every migration not yet recorded in `_migrations`.
///
/// Each migration runs in its own transaction together with its bookkeeping
/// row. Returns the number of migrations applied by this call.
pub async fn run_migrations(
    pool: &DbPool,
    migrations: &[(String, Migration)],
) -> anyhow::Result<usize> {
    sqlx::query(MIGRATIONS_TABLE)
        .execute(pool)
        .await
        .context("failed to create migrations table")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let already: Option<(String,)> =
            sqlx::query_as("SELECT id FROM _migrations WHERE module = ? AND id = ?")
                .bind(module)
                .bind(migration.id)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("failed to check migration {module}/{}", migration.id))?;

        if already.is_some() {
            tracing::debug!(target: "library-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration {module}/{} failed", migration.id))?;
        sqlx::query("INSERT INTO _migrations (module, id, applied_at) VALUES (?, ?, ?)")
            .bind(module)
            .bind(migration.id)
            .bind(OffsetDateTime::now_utc())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(target: "library-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
