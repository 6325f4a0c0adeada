use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs the fmt subscriber once. `RUST_LOG` overrides the `info` default.
pub fn init_logging() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // another subscriber may win the race in tests
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}
