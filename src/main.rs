//! retrofeed: an endless feed of vintage-computing artifacts from the Internet Archive

use anyhow::Result;
use clap::{Parser, Subcommand};
use retrofeed::config::{Config, LogFormat, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::OutputFormat;

#[derive(Parser)]
#[command(name = "retrofeed")]
#[command(about = "Endless feed of vintage-computing artifacts from the Internet Archive")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "retrofeed.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the archive once
    Search {
        /// Search query
        query: String,

        /// Result page (starts at 1)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Scrape a single archive item page
    Item {
        /// Detail page URL (https://archive.org/details/...)
        url: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print pages from the endless feed
    Stream {
        /// Number of pages to print
        #[arg(short, long, default_value = "3")]
        pages: u32,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the HTTP API server
    Serve {
        /// Listen address, overrides the config file
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Search { query, page, format } => {
            commands::search::search_archive(config, query, page, format).await
        }
        Commands::Item { url, format } => commands::item::show_item(config, url, format).await,
        Commands::Stream { pages, format } => {
            commands::stream::stream_feed(config, pages, format).await
        }
        Commands::Serve { listen } => commands::serve::serve(config, listen).await,
        Commands::Init { path } => commands::init::init_config(path),
    }
}

/// Install the global subscriber; `-v` raises the configured level
fn init_logging(logging: &LoggingConfig, verbose: u8) -> Result<()> {
    let level = logging.effective_level(verbose);

    match logging.format {
        LogFormat::Text => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(false)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = FmtSubscriber::builder()
                .json()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
