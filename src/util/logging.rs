use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging system with tracing.
///
/// The crate is normally embedded in a host that owns the subscriber;
/// this helper exists for demos and standalone testing. The `verbose`
/// flag controls whether debug logs are shown.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("tapcue=debug,warn")
    } else {
        EnvFilter::new("tapcue=info,warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();

    Ok(())
}
