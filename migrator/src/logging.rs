//! Diagnostic tracing for the migrator binary.
//!
//! Tracing goes to stderr and is controlled by `RUST_LOG`. Command results are
//! printed to stdout by the CLI and are unaffected by the filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
///
/// `--verbose` surfaces the per-step `running migration` events.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "migrator=info,warn" } else { "warn" }
}

/// Initialize the tracing subscriber. `RUST_LOG` takes precedence over
/// `verbose`.
///
/// # Example
/// ```bash
/// RUST_LOG=migrator=debug migrator migrate state.json
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).compact())
        .init();
}
