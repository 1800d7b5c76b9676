//! Tracing subscriber setup for the `jsbuffer` binary.

use std::sync::Once;

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Install the global subscriber. `RUST_LOG` wins over `default_level`;
/// later calls are ignored.
pub fn init_tracing(default_level: &str) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr);

        // another subscriber may already be installed (e.g. by an embedder)
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init();

        debug!(default_level, "tracing initialized");
    });
}
