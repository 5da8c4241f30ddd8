//! # CLI Interface
//!
//! Defines the command-line argument structure for `credvault-server` using
//! `clap` derive. Two subcommands: `run` and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use credvault::config::{DEFAULT_MAX_PAYLOAD_BYTES, DEFAULT_SHARE_TTL_SECS};

/// Credential vault server.
///
/// Holds one owner's wallet, stores their verifiable credentials encrypted
/// at rest, and issues short-lived share tokens for them over a JSON API.
#[derive(Parser, Debug)]
#[command(
    name = "credvault-server",
    about = "Credential vault server",
    version,
    propagate_version = true
)]
pub struct CredvaultCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API and metrics servers.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Port for the REST API.
    #[arg(long, short = 'p', env = "CREDVAULT_PORT", default_value_t = 4000)]
    pub port: u16,

    /// Port for the Prometheus metrics endpoint.
    #[arg(long, env = "CREDVAULT_METRICS_PORT", default_value_t = 4001)]
    pub metrics_port: u16,

    /// Directory for the sled database.
    ///
    /// When omitted the wallet and credentials live in memory and are lost
    /// on exit.
    #[arg(long, short = 'd', env = "CREDVAULT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Default share-token lifetime in seconds.
    #[arg(long, env = "CREDVAULT_SHARE_TTL_SECS", default_value_t = DEFAULT_SHARE_TTL_SECS)]
    pub share_ttl_secs: i64,

    /// Largest accepted credential payload, in bytes of canonical JSON.
    #[arg(long, env = "CREDVAULT_MAX_PAYLOAD_BYTES", default_value_t = DEFAULT_MAX_PAYLOAD_BYTES)]
    pub max_payload_bytes: usize,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "CREDVAULT_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        CredvaultCli::command().debug_assert();
    }

    #[test]
    fn run_defaults() {
        let cli = CredvaultCli::try_parse_from(["credvault-server", "run"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.share_ttl_secs, DEFAULT_SHARE_TTL_SECS);
        assert_eq!(args.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn run_flags_override_defaults() {
        let cli = CredvaultCli::try_parse_from([
            "credvault-server",
            "run",
            "--port",
            "8080",
            "--data-dir",
            "/tmp/vault",
            "--share-ttl-secs",
            "60",
            "--log-format",
            "json",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/vault")));
        assert_eq!(args.share_ttl_secs, 60);
        assert_eq!(args.log_format, "json");
    }
}
