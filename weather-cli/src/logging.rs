use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing on stderr.
///
/// Only errors are shown by default so the weather card stays readable;
/// set `RUST_LOG` (e.g. `RUST_LOG=weather_core=debug`) for request tracing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}
