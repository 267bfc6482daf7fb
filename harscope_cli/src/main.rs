//! Harscope - Browse HTTP Archive (HAR) traces in the terminal
//!
//! Usage:
//!   harscope [FILE]              Open the viewer, optionally importing FILE
//!   harscope --demo 5000         Open the viewer with synthetic entries
//!   harscope --listen 9229       Accept live entries on 127.0.0.1:9229
//!   harscope summary <FILE>      Print the filtered, sorted view and stats

mod capture;
mod commands;
mod config;
mod import;
mod tui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use harscope_core::FilterType;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "harscope")]
#[command(author = "Harscope Team")]
#[command(version)]
#[command(about = "Browse HTTP Archive (HAR) traces in the terminal", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// HAR file to open
    file: Option<PathBuf>,

    /// Load this many synthetic entries
    #[arg(long, value_name = "COUNT")]
    demo: Option<usize>,

    /// Accept live entries over HTTP on this loopback port
    #[arg(short, long, value_name = "PORT")]
    listen: Option<u16>,

    /// Start with recording paused
    #[arg(long)]
    paused: bool,

    #[command(flatten)]
    criteria: CriteriaArgs,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the filtered, sorted view of a HAR file and its stats
    Summary {
        /// HAR file to summarize
        file: PathBuf,

        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Print at most this many rows
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

/// Filter and sort presets shared by the viewer and `summary`
#[derive(Args, Debug, Clone, Default)]
struct CriteriaArgs {
    /// Filter text (substring of URL, method, status or MIME type)
    #[arg(short, long)]
    filter: Option<String>,

    /// Only show these resource types (repeatable: xhr, js, css, img, ...)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    types: Vec<FilterType>,

    /// Sort key (name, status, method, type, size, time, waterfall)
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    desc: bool,
}

impl From<CriteriaArgs> for commands::Presets {
    fn from(args: CriteriaArgs) -> Self {
        Self {
            filter: args.filter,
            types: args.types,
            sort: args.sort,
            desc: args.desc,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Ensure config directories exist
    config::ensure_dirs()?;

    // The viewer owns the terminal, so it logs to a file
    init_logging(cli.verbose, cli.command.is_none())?;

    match cli.command {
        Some(Commands::Summary {
            file,
            criteria,
            limit,
        }) => {
            let opts = commands::summary::SummaryOptions {
                file,
                presets: criteria.into(),
                limit,
            };
            commands::summary::run(opts).await?;
        }

        None => {
            let opts = commands::view::ViewOptions {
                file: cli.file,
                demo: cli.demo,
                listen: cli.listen,
                paused: cli.paused,
                presets: cli.criteria.into(),
            };
            commands::view::run(opts).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, to_file: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { "warn" };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{},harscope_cli=info", log_level).into()),
    );

    if to_file {
        let path = config::log_file();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_viewer_arguments() {
        let cli = Cli::parse_from([
            "harscope", "trace.har", "--listen", "9229", "--paused", "-t", "xhr", "-t", "js",
            "--sort", "size", "--desc",
        ]);
        assert!(cli.command.is_none());
        assert_eq!(cli.file, Some(PathBuf::from("trace.har")));
        assert_eq!(cli.listen, Some(9229));
        assert!(cli.paused);
        assert_eq!(cli.criteria.types, vec![FilterType::Xhr, FilterType::Js]);
        assert_eq!(cli.criteria.sort.as_deref(), Some("size"));
        assert!(cli.criteria.desc);
    }

    #[test]
    fn test_summary_subcommand() {
        let cli = Cli::parse_from(["harscope", "summary", "trace.har", "-f", "api", "-n", "10"]);
        match cli.command {
            Some(Commands::Summary {
                file,
                criteria,
                limit,
            }) => {
                assert_eq!(file, PathBuf::from("trace.har"));
                assert_eq!(criteria.filter.as_deref(), Some("api"));
                assert_eq!(limit, Some(10));
            }
            None => panic!("expected summary"),
        }
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Cli::try_parse_from(["harscope", "-t", "bogus"]).is_err());
    }
}
