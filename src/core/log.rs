use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Set to `json` for one JSON object per log line.
pub const LOG_FORMAT_ENV: &str = "MARKETBOARD_LOG_FORMAT";

/// Per-crate levels. With `verbose` only this crate and the HTTP trace
/// layer go below warn; otherwise everything is left to the env filter.
fn app_targets(verbose: bool) -> Targets {
    if verbose {
        Targets::new()
            .with_target("marketboard", LevelFilter::DEBUG)
            .with_target("tower_http", LevelFilter::DEBUG)
            .with_default(LevelFilter::WARN)
    } else {
        Targets::new().with_default(LevelFilter::TRACE)
    }
}

/// Installs the global subscriber, writing to stderr. `RUST_LOG` overrides
/// `default_level`; `verbose` turns on debug output for this crate.
pub fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry()
        .with(app_targets(verbose))
        .with(env_filter);

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
