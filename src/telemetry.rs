//! Logging setup shared by the binaries.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global fmt subscriber.
///
/// Logs go to stderr so stdout only carries results. `RUST_LOG` overrides
/// the default level.
pub fn init(default_level: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
