//! Logging and tracing bootstrap.

use library_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this more
/// than once keeps the first subscriber.
pub fn init(settings: &TelemetrySettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match settings.log_format {
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init().is_ok(),
        LogFormat::Json => fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!(
            target: "library-telemetry",
            format = ?settings.log_format,
            filter = %settings.log_filter,
            "telemetry initialized"
        );
    }
}
