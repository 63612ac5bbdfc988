//! CLI module for the nearby places gateway

pub mod serve;

use clap::{Parser, Subcommand};

/// Nearby places gateway - geo-bucketed caching proxy for places search
#[derive(Parser)]
#[command(name = "nearby-places-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve(serve::ServeArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_overrides() {
        let cli = Cli::try_parse_from(["nearby-places-gateway", "serve", "--port", "9090"]).unwrap();

        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.port, Some(9090));
                assert!(args.host.is_none());
            }
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["nearby-places-gateway"]).is_err());
    }
}
