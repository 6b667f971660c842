//! CLI module for Argus
//!
//! Provides command-line interface parsing and handling for the `argus` binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::reporting::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Argus - concurrent reconnaissance orchestrator
///
/// Runs independent recon agents against one target in parallel and merges
/// their findings into a single report.
#[derive(Parser, Debug)]
#[command(
    name = "argus",
    version,
    about = "Argus - concurrent multi-agent reconnaissance",
    long_about = "Runs web, OSINT, subdomain and vulnerability agents against a target\n\
                  concurrently and compiles one report from their combined findings.\n\n\
                  Only scan targets you are authorized to test.",
    after_help = "EXAMPLES:\n    \
                  argus init                          # Write argus.toml and .env.example\n    \
                  argus scan example.com              # Full scan with the LLM agents\n    \
                  argus scan example.com --no-llm     # Run the tools directly, no API key needed\n    \
                  argus scan https://example.com -f json --deadline 300"
)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./argus.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a reconnaissance scan against a domain or URL
    Scan {
        /// Target domain or URL, e.g. example.com or https://example.com
        target: String,

        /// Report format to write
        #[arg(short, long, value_enum)]
        format: Option<ReportFormat>,

        /// Directory for report files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Run each agent's tools directly instead of through the LLM
        #[arg(long)]
        no_llm: bool,

        /// Abort agents still running after this many seconds
        #[arg(long, value_name = "SECS")]
        deadline: Option<u64>,
    },

    /// Write a starter argus.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Manage agents
    #[command(subcommand)]
    Agent(AgentCommands),
}

/// Agent management subcommands
#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List the built-in agents and their tools
    List,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from([
            "argus", "scan", "example.com", "--no-llm", "-f", "json", "--deadline", "30",
        ])
        .unwrap();
        match cli.command {
            Commands::Scan {
                target,
                format,
                no_llm,
                deadline,
                output_dir,
            } => {
                assert_eq!(target, "example.com");
                assert_eq!(format, Some(ReportFormat::Json));
                assert!(no_llm);
                assert_eq!(deadline, Some(30));
                assert!(output_dir.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["argus", "agent", "list", "--no-color", "-c", "x.toml"])
            .unwrap();
        assert!(cli.no_color);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::Agent(AgentCommands::List)));
    }

    #[test]
    fn test_scan_requires_target() {
        assert!(Cli::try_parse_from(["argus", "scan"]).is_err());
    }
}
