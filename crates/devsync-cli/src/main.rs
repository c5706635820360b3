//! devsync CLI - Command-line interface for devsync
//!
//! Provides commands for:
//! - Resolving volume paths into sync agent mounts
//! - Rendering the sync agent's folder configuration
//! - Viewing and validating configuration
//! - Generating shell completions

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use devsync_core::config::Config;
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    agent_config::AgentConfigCommand, completions::CompletionsCommand, config::ConfigCommand,
    mounts::MountsCommand, CliContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "devsync",
    version,
    about = "Keep local volumes synchronized with remote dev containers"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the sync mounts for a set of volumes
    Mounts(MountsCommand),
    /// Render the sync agent folder configuration
    AgentConfig(AgentConfigCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let (config, config_error) = load_config(&config_path);

    // Setup tracing
    let filter = log_filter(cli.verbose, cli.quiet, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(error) = config_error {
        warn!(
            config_path = %config_path.display(),
            error = %format!("{error:#}"),
            "Ignoring unreadable configuration file, using defaults"
        );
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext {
        format,
        quiet: cli.quiet,
        config,
        config_path,
    };

    match cli.command {
        Commands::Mounts(cmd) => cmd.execute(&ctx),
        Commands::AgentConfig(cmd) => cmd.execute(&ctx),
        Commands::Config(cmd) => cmd.execute(&ctx),
        Commands::Completions(cmd) => cmd.execute(),
    }
}

/// Loads the config file, falling back to defaults
///
/// A missing file is not an error. A file that exists but cannot be read or
/// parsed is returned alongside the defaults so it can be reported once
/// logging is up.
fn load_config(path: &Path) -> (Config, Option<anyhow::Error>) {
    match Config::load_if_present(path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(error) => (Config::default(), Some(error)),
    }
}

/// Log directive used when `RUST_LOG` is not set
fn log_filter(verbose: u8, quiet: bool, configured: &str) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_filter_levels() {
        assert_eq!(log_filter(0, false, "warn"), "warn");
        assert_eq!(log_filter(1, false, "warn"), "debug");
        assert_eq!(log_filter(3, false, "warn"), "trace");
        assert_eq!(log_filter(0, true, "info"), "error");
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let (config, error) = load_config(&dir.path().join("config.yaml"));
        assert!(error.is_none());
        assert!(!config.sync.strict);
    }

    #[test]
    fn test_load_config_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sync:\n  strict: true\n").unwrap();

        let (config, error) = load_config(&path);

        assert!(error.is_none());
        assert!(config.sync.strict);
    }

    #[test]
    fn test_load_config_reports_malformed_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "sync:\n  strict: [not, a, bool\n").unwrap();

        let (config, error) = load_config(&path);

        assert!(error.is_some());
        assert!(!config.sync.strict);
    }

    #[test]
    fn test_parse_mounts_with_paths() {
        let cli = Cli::parse_from(["devsync", "--json", "mounts", "/a/f1", "/a/f2"]);
        assert!(cli.json);
        match cli.command {
            Commands::Mounts(cmd) => {
                assert_eq!(cmd.volumes.paths, vec!["/a/f1", "/a/f2"]);
                assert!(cmd.volumes.compose.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_agent_config_write_without_dir() {
        let cli = Cli::parse_from(["devsync", "agent-config", "--compose", "dc.yml", "--write"]);
        match cli.command {
            Commands::AgentConfig(cmd) => {
                assert_eq!(cmd.volumes.compose, Some(PathBuf::from("dc.yml")));
                assert_eq!(cmd.write, Some(None));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_agent_config_write_with_dir() {
        let cli = Cli::parse_from(["devsync", "agent-config", "/a", "--write", "/tmp/agent"]);
        match cli.command {
            Commands::AgentConfig(cmd) => {
                assert_eq!(cmd.volumes.paths, vec!["/a"]);
                assert_eq!(cmd.write, Some(Some(PathBuf::from("/tmp/agent"))));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["devsync", "-q", "-v", "mounts", "/a"]).is_err());
    }
}
