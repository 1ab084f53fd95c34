//! Logging and tracing infrastructure for elfscope.
//!
//! Structured logging through the tracing crate. Logs always go to stderr so
//! that stdout carries nothing but the report.

use std::io::{self, IsTerminal};
use std::sync::Once;
use tracing::debug;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

static INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber on first call; later calls are no-ops.
fn install(json: bool) {
    INIT.call_once(|| {
        let fmt_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);
        let registry = tracing_subscriber::registry().with(env_filter());

        // A subscriber installed elsewhere (e.g. by a test harness) wins.
        let installed = if json {
            registry
                .with(fmt_layer.json().with_current_span(true))
                .try_init()
        } else {
            registry.with(fmt_layer).try_init()
        };
        if installed.is_ok() {
            debug!(json, "elfscope tracing initialized");
        }
    });
}

/// Initialize the global tracing subscriber with human-readable output.
///
/// This should be called once at program startup.
/// Subsequent calls are ignored.
pub fn init_tracing() {
    install(false);
}

/// Initialize tracing with JSON output for structured logging.
pub fn init_tracing_json() {
    install(true);
}

/// Initialize tracing in the mode selected by configuration.
pub fn init(json: bool) {
    install(json);
}
