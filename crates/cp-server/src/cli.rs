//! Command-line argument definitions.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Car pooling dispatch service.
///
/// Allocates a fixed fleet of vehicles to groups of people who want to
/// travel together, and frees the vehicles when the groups are dropped off.
#[derive(Debug, Parser)]
#[command(name = "carpool", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP service.
    Serve {
        /// Address to listen on (overrides the configured `bind`).
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Print the effective configuration as JSON.
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_bind_override() {
        let cli = Cli::try_parse_from(["carpool", "-v", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Serve { bind }) => {
                assert_eq!(bind, Some("0.0.0.0:9000".parse().unwrap()));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_rejects_bad_address() {
        assert!(Cli::try_parse_from(["carpool", "serve", "--bind", "nowhere"]).is_err());
    }
}
