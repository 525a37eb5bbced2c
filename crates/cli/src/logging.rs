// Diagnostics on stderr.
//
// The library crates log through the `log` facade. The fmt subscriber
// installed here picks those records up through its `log` bridge.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Filter directives for a run, e.g. `debug` or `cellboard_io=trace`.
pub const LOG_ENV: &str = "CELLBOARD_LOG";

/// Filter for a run: `--verbose` wins, then the `CELLBOARD_LOG` directives,
/// then `default`. Unparsable directives are skipped.
pub fn filter(verbose: bool, env: Option<&str>, default: LevelFilter) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(default.into());
    if verbose {
        return builder.parse_lossy("debug");
    }
    builder.parse_lossy(env.unwrap_or_default())
}

/// Install the subscriber. Later calls are ignored.
pub fn init(filter: EnvFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
