//! Test log output.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_DIRECTIVE: &str = "flightdeck_pages=info";

static INIT: Once = Once::new();

/// Install a fmt subscriber writing to the test harness' captured output.
///
/// Safe to call from every test; only the first call installs anything, and
/// an already-installed global subscriber is left in place.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
