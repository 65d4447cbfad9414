//! Diagnostic logging for the CLI
//!
//! Filtering follows `RUST_LOG`:
//! - `RUST_LOG=debug` - composition and store steps
//! - `RUST_LOG=glove80_layouts::generator=info` - written artifacts only
//!
//! Without `RUST_LOG` only warnings are shown, or everything down to
//! `debug` with `--verbose`. Output goes to stderr so documents printed on
//! stdout stay parseable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber. Calling it twice is a no-op.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter);

    let _ = tracing_subscriber::registry().with(console_layer).try_init();
}
