//! Log subscriber setup for the CLI.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Filter used when neither `--log` nor `ITEMKEY_LOG` is given.
pub(crate) const DEFAULT_FILTER: &str = "warn";

/// Install a global `fmt` subscriber writing to stderr, filtered by
/// `filter` (an `EnvFilter` directive such as `itemkey=debug`).
pub(crate) fn init(filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter '{filter}'"))?;

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(io::stderr)
        // No colour codes when stderr is redirected.
        .with_ansi(io::stderr().is_terminal())
        .without_time()
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}
