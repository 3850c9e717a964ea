//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "wikigraph_client=info,wikigraph_cache=info,warn";

/// Install a global fmt subscriber filtered by `RUST_LOG`.
///
/// Fails if a global subscriber is already set; callers that may run twice
/// (tests) can ignore the error.
pub fn init_tracing() -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    tracing::debug!(filter = DEFAULT_FILTER, "tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Another test may already have installed a subscriber.
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }

    #[test]
    fn test_default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
