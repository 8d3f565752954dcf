use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Land-use trend and change-probability analysis service.
#[derive(Parser)]
#[command(
    name = "landtrend",
    version,
    about = "Land-use trend and change-probability analysis service"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API.
    Serve(ServeArgs),
}

/// Arguments for the `serve` subcommand.
#[derive(clap::Args)]
pub struct ServeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override bind address from config.
    #[arg(long)]
    pub host: Option<String>,

    /// Override listen port from config.
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_overrides_parse() {
        let cli = Cli::try_parse_from([
            "landtrend", "-vv", "serve", "--host", "127.0.0.1", "--port", "9000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Command::Serve(args) = cli.command;
        assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(args.port, Some(9000));
        assert!(args.config.is_none());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["landtrend"]).is_err());
    }
}
