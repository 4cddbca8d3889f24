//! Diagnostic logging setup
//!
//! Library code only emits `tracing` events. Embedders that want them on
//! stderr call [`init_tracing`] once at startup; `RUST_LOG` overrides the
//! default filter.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "fintrack=info";

/// Install a global fmt subscriber. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

        // Another subscriber may already be installed by the host
        let _ = fmt().with_env_filter(filter).with_target(true).try_init();
    });
}
