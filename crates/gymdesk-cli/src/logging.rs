// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Stderr logging for the `gymdesk` binary.
//!
//! Filter precedence: `GYMDESK_LOG`, then `RUST_LOG`, then `-v`/`-q`,
//! then `warn`.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    /// `-v` wins when both flags are given.
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if verbose {
            Self::Verbose
        } else if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    pub const fn default_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::DEBUG,
        }
    }
}

pub fn init_subscriber(verbosity: Verbosity) -> Result<()> {
    let filter = build_env_filter(
        verbosity,
        std::env::var("GYMDESK_LOG").ok().as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
    );
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity == Verbosity::Verbose);
    let installed = if verbosity == Verbosity::Verbose {
        builder.try_init()
    } else {
        builder.without_time().compact().try_init()
    };
    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}

/// Unparseable directives fall through to the next source instead of
/// failing startup.
fn build_env_filter(
    verbosity: Verbosity,
    app_directives: Option<&str>,
    rust_log: Option<&str>,
) -> EnvFilter {
    for directives in [app_directives, rust_log].into_iter().flatten() {
        if let Ok(filter) = EnvFilter::try_new(directives) {
            return filter;
        }
    }

    let level = verbosity.default_level();
    let base = level.as_str().to_ascii_lowercase();
    let directive = if verbosity == Verbosity::Verbose {
        format!("{base},gymdesk_view=trace")
    } else {
        base
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}
