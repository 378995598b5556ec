// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup. Logs always go to stderr so JSON on stdout stays clean.

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins over `level` when set
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
