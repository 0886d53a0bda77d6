use anyhow::Context;
use library_kernel::settings::Settings;

fn main() -> anyhow::Result<()> {
    library_app::runtime()?.block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load library settings")?;
    library_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "library-app bootstrap starting"
    );

    library_app::serve(&settings).await?;

    tracing::info!("library-app shut down");
    Ok(())
}
