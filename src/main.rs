//! universal-search - cross-platform file search tool server

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use universal_search::config::Config;
use universal_search::mcp::{ToolServer, tool};
use universal_search::platform::{self, Platform};
use universal_search::search::{self, SearchBackend};
use universal_search::{EverythingOptions, SearchQuery};

/// universal-search - file search over mdfind, locate or Everything
#[derive(Parser)]
#[command(name = "universal-search")]
#[command(version)]
#[command(about = "Cross-platform file search tool server", long_about = None)]
struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the search tool over stdin/stdout (default)
    Serve,

    /// Run a single search and print the results
    Search {
        /// Search query
        query: String,

        /// Maximum number of results (1-1000)
        #[arg(short = 'n', long, default_value_t = 100)]
        max_results: u32,

        /// Match against the full path instead of the file name
        #[arg(short = 'p', long)]
        match_path: bool,

        /// Case-sensitive search
        #[arg(short = 'c', long)]
        match_case: bool,

        /// Match whole words only
        #[arg(short = 'w', long)]
        match_whole_word: bool,

        /// Treat the query as a regular expression
        #[arg(short = 'r', long)]
        match_regex: bool,

        /// Sort order (backend-defined)
        #[arg(short, long, default_value_t = 1)]
        sort_by: u32,

        /// Skip this many results (Everything only)
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Show the backend selected for this platform
    Backend,

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    init_logging(&config.service.log_level);
    platform::configure_console();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            serve(&config).await?;
        }

        Commands::Search {
            query,
            max_results,
            match_path,
            match_case,
            match_whole_word,
            match_regex,
            sort_by,
            offset,
        } => {
            let mut query = SearchQuery::new(query)
                .with_max_results(max_results)
                .with_match_path(match_path)
                .with_match_case(match_case)
                .with_match_whole_word(match_whole_word)
                .with_match_regex(match_regex)
                .with_sort_by(sort_by);
            if let Some(offset) = offset {
                query = query.with_everything(EverythingOptions { offset });
            }
            search_files(&config, query).await?;
        }

        Commands::Backend => {
            show_backend(&config)?;
        }

        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the protocol
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn init_backend(config: &Config) -> Result<SearchBackend> {
    search::resolve(config).context("Failed to initialize search backend")
}

/// Run the tool server until stdin closes
async fn serve(config: &Config) -> Result<()> {
    let backend = Arc::new(init_backend(config)?);
    let timeout = Duration::from_secs(config.search.timeout_secs);

    let server = Arc::new(ToolServer::new(backend, timeout));
    server.run().await?;

    info!("Server stopped");
    Ok(())
}

/// Run one query and print the rendered results
async fn search_files(config: &Config, query: SearchQuery) -> Result<()> {
    let backend = init_backend(config)?;

    let results = tokio::task::spawn_blocking(move || backend.search(&query))
        .await
        .context("Search task failed")?
        .context("Search failed")?;

    println!("{}", tool::render_results(&results));
    Ok(())
}

/// Print the resolved backend and what it supports
fn show_backend(config: &Config) -> Result<()> {
    let platform = Platform::current()?;
    let backend = init_backend(config)?;

    println!("universal-search backend");
    println!("========================");
    println!("Platform:   {}", platform);
    println!("Backend:    {}", backend.kind());
    println!("Supports:   {}", backend.capabilities().honored().join(", "));
    if let SearchBackend::Everything(everything) = &backend {
        println!("SDK path:   {}", everything.sdk_path().display());
    }
    println!();
    println!("{}", tool::description(backend.kind()));

    Ok(())
}

/// Print the active configuration
fn show_config(config: &Config) -> Result<()> {
    println!("universal-search configuration");
    println!("==============================");
    println!("Config file:   {}", config.config_path.display());
    println!("Timeout:       {}s", config.search.timeout_secs);
    println!("Log level:     {}", config.service.log_level);
    println!("SDK path:      {}", config.sdk_path().display());

    Ok(())
}
