//! # Structured Logging
//!
//! One `tracing` subscriber for the whole process, writing to stderr so that
//! `credvault-server version` output on stdout stays pipeable.
//!
//! ## Targets
//!
//! | Target            | Events                                                      |
//! |-------------------|-------------------------------------------------------------|
//! | `credvault`       | wallet provisioned, credential stored, share token issued, |
//! |                   | share token rejected (debug), payload decryption failed    |
//! | `credvault_server`| startup, store selection, bind addresses, shutdown          |
//! | `tower_http`      | one span per HTTP request                                   |
//!
//! Events carry wallet ids, DIDs, credential ids and hashes as fields. Key
//! material and decrypted payloads are never logged. [`DEFAULT_FILTER`]
//! applies unless `RUST_LOG` is set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "credvault_server=info,credvault=info,tower_http=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, colored output. Suitable for local development.
    Pretty,
    /// Machine-parseable JSON lines. Suitable for production log aggregation.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "pretty" (case-insensitive).
    /// Returns `Pretty` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Call this exactly once, early in `main()`. Subsequent calls will panic.
///
/// `default_level` applies when `RUST_LOG` is unset. To see why share
/// tokens are being refused:
///
/// ```text
/// RUST_LOG=credvault=debug,credvault_server=info
/// ```
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::info!("logging initialized (format={:?})", format);
}
