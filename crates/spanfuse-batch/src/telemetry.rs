//! Tracing subscriber setup for binaries built on this crate.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global subscriber logging `spanfuse` crates at `info` when
/// verbose and `warn` otherwise. `RUST_LOG` overrides the default filter.
pub fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_filter = if verbose {
        "spanfuse=info,spanfuse_batch=info"
    } else {
        "spanfuse=warn,spanfuse_batch=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;
    Ok(())
}
