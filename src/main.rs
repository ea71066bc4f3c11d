//! # Discmaster Proxy CLI (`dmproxy`)
//!
//! The `dmproxy` binary fronts the discmaster.textfiles.com search
//! service. It can run the HTTP proxy server or issue one-off searches
//! and catalog lookups from the command line.
//!
//! ## Usage
//!
//! ```bash
//! dmproxy --config ./dmproxy.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dmproxy serve` | Start the HTTP proxy server |
//! | `dmproxy search "<query>"` | Search the archive from the command line |
//! | `dmproxy describe <hash>` | Print the catalog description for a hash |
//!
//! ## Examples
//!
//! ```bash
//! # Start the proxy on the configured bind address
//! dmproxy serve --config ./dmproxy.toml
//!
//! # One page of plain results
//! dmproxy search "keen"
//!
//! # Every copy of each matching file, collapsed by content hash
//! dmproxy search "wolf3d" --grouped --sort ts
//!
//! # What do we know about this hash?
//! dmproxy describe 0123456789abcdef
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use discmaster_proxy::catalog::DescriptionCatalog;
use discmaster_proxy::search_cmd::SearchOptions;
use discmaster_proxy::{config, describe_cmd, search_cmd, server};

/// Discmaster Proxy CLI.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `dmproxy.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dmproxy",
    about = "Search aggregation proxy for the discmaster.textfiles.com file archive",
    version,
    long_about = "dmproxy fronts the discmaster.textfiles.com search endpoint: it drains \
    paginated results, collapses identical files by content hash, recovers the total match \
    count from the HTML results page, and attaches locally curated descriptions."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./dmproxy.toml`. A missing file falls back to the
    /// built-in defaults; a malformed file is an error.
    #[arg(long, global = true, default_value = "./dmproxy.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP proxy server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// search route plus a health check.
    Serve,

    /// Search the archive from the command line.
    ///
    /// Runs the same pipeline as the HTTP server and prints the results.
    /// With `--grouped`, every result page is drained and identical files
    /// are collapsed by content hash.
    Search {
        /// The search query string.
        query: String,

        /// Group results by content hash instead of listing raw hits.
        #[arg(long)]
        grouped: bool,

        /// Sort order for grouped results: `ts`, `size`, or `hash`.
        #[arg(long)]
        sort: Option<String>,

        /// Page size for ungrouped searches.
        #[arg(long, default_value_t = 100)]
        limit: u32,

        /// Page index (starting at 0) for ungrouped searches.
        #[arg(long, default_value_t = 0)]
        page: u32,

        /// Only match files dated on or after this date (YYYY-MM-DD).
        #[arg(long)]
        ts_min: Option<String>,

        /// Only match files dated on or before this date (YYYY-MM-DD).
        #[arg(long)]
        ts_max: Option<String>,
    },

    /// Print the catalog description for a content hash.
    Describe {
        /// Full content hash as reported in search results.
        hash: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    let catalog = DescriptionCatalog::load(&cfg.catalog.dir)?;
    tracing::debug!(descriptions = catalog.len(), "catalog loaded");

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg, catalog).await?;
        }
        Commands::Search {
            query,
            grouped,
            sort,
            limit,
            page,
            ts_min,
            ts_max,
        } => {
            let options = SearchOptions {
                grouped,
                sort,
                limit,
                page,
                ts_min,
                ts_max,
            };
            search_cmd::run_search(&cfg, &catalog, &query, &options).await?;
        }
        Commands::Describe { hash } => {
            describe_cmd::run_describe(&catalog, &hash)?;
        }
    }

    Ok(())
}
