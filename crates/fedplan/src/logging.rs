//! Tracing setup for the CLI
//!
//! Logs go to stderr so command output on stdout stays pipeable. The level
//! comes from `--log-level`, overridable with `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init(level: &str) -> color_eyre::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    Ok(())
}
