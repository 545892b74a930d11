//! File logging for embedders that have no subscriber of their own.
//!
//! A terminal client owns the screen, so log output goes to a file. The
//! filter comes from `RUST_LOG` and defaults to [`DEFAULT_DIRECTIVE`].

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "mudterm=info";

/// Build a subscriber writing to `log_file`.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(log_file))
        .with_ansi(false);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer)
}

/// Install the global subscriber, logging to `path` (truncated).
///
/// Fails if the file cannot be created or a global subscriber is already set.
pub fn init(path: &Path) -> io::Result<()> {
    let log_file = File::create(path)?;
    build_subscriber(log_file)
        .try_init()
        .map_err(io::Error::other)
}
