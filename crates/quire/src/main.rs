//! Quire CLI - Markdown content catalog.
//!
//! Provides commands for:
//! - `list`: Print one sorted page of a collection
//! - `show`: Print a single document with rendered content
//! - `resolve`: Map a request path to a document identifier
//! - `clear-cache`: Drop cached collection indexes

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ClearCacheArgs, GlobalArgs, ListArgs, ResolveArgs, ShowArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Quire - Markdown content catalog.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documents of a collection.
    List(ListArgs),
    /// Show a single document.
    Show(ShowArgs),
    /// Resolve a request path to a document identifier.
    Resolve(ResolveArgs),
    /// Clear cached collection indexes.
    ClearCache(ClearCacheArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to ERROR.
    // Logs go to stderr so listings on stdout stay pipeable.
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::List(args) => args.execute(&cli.global, &output),
        Commands::Show(args) => args.execute(&cli.global, &output),
        Commands::Resolve(args) => args.execute(&cli.global, &output),
        Commands::ClearCache(args) => args.execute(&cli.global, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
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
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "quire",
            "list",
            "blog",
            "--no-cache",
            "--set",
            "collections.blog.per_page=5",
        ])
        .unwrap();
        assert!(cli.global.no_cache);
        assert_eq!(
            cli.global.set,
            vec![("collections.blog.per_page".to_owned(), "5".to_owned())]
        );
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_rejects_malformed_override() {
        let result = Cli::try_parse_from(["quire", "--set", "novalue", "list", "blog"]);
        assert!(result.is_err());
    }
}
