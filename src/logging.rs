//! Tracing subscriber setup.

use tracing_subscriber::{
    filter::{Directive, EnvFilter},
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer,
};

use crate::error::{ReactorError, Result};

/// Install the global subscriber
///
/// `default_level` is the default directive (e.g. `info`,
/// `meshpulse=debug`); `RUST_LOG` takes precedence. Logs go to stderr so
/// stdout stays free for run summaries.
pub fn init(default_level: &str) -> Result<()> {
    let directive = default_level.parse::<Directive>().map_err(|e| {
        ReactorError::Config(format!("invalid log level '{}': {}", default_level, e))
    })?;

    let filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| ReactorError::Config(format!("logging already initialised: {}", e)))
}
