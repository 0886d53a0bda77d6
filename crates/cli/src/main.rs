use anyhow::Context;
use clap::{Parser, Subcommand};
use library_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "library-cli", version, about = "Library catalogue service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    library_app::runtime()?.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {

    let settings = Settings::load().with_context(|| "failed to load library settings")?;
    library_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve => library_app::serve(&settings).await,
        Command::Migrate => {
            let applied = library_app::migrate(&settings).await?;
            tracing::info!(applied, db = %settings.database.url, "migrations applied");
            println!("{applied} migration(s) applied");
            Ok(())
        }
    }
}
