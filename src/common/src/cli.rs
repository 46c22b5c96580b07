use clap::Parser;
use std::path::PathBuf;

/// Common CLI arguments shared across all dashkit commands
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, global = true, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::Configuration;
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Pick the log filter: RUST_LOG wins, then the verbosity flags, then the
    /// configured default.
    pub fn log_filter(args: &CommonArgs, config: &Configuration) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }

        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            config.log.level.as_str()
        };

        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Initialize logging based on CLI arguments. Output goes to stderr so
    /// rendered JSON on stdout stays clean.
    pub fn init_logging(args: &CommonArgs, config: &Configuration) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(log_filter(args, config))
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Load configuration with optional override from CLI
    pub fn load_config(config_path: Option<&PathBuf>) -> Result<Configuration> {
        match config_path {
            Some(path) => {
                Configuration::load_from_path(path).context("Failed to load configuration")
            }
            None => Configuration::load().context("Failed to load configuration"),
        }
    }

    /// Display configuration in human-readable or JSON format
    pub fn display_config(config: &Configuration, json: bool) -> Result<()> {
        if json {
            let json = serde_json::to_string_pretty(config)
                .context("Failed to serialize configuration to JSON")?;
            println!("{json}");
        } else {
            println!("dashkit configuration:");
            println!("======================");
            println!("Table schema policy: {}", config.table.schema_policy);
            println!("Log level: {}", config.log.level);
        }
        Ok(())
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "{} {} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}
