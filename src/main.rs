use std::path::PathBuf;

use clap::{Parser, Subcommand};

use showcase::api::routes::CacheStatus;
use showcase::{Config, ProjectFeed, Result};

#[derive(Parser)]
#[command(name = "showcase", version, about = "Cached GitHub project feed for a portfolio site")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    /// GitHub account to list (overrides GITHUB_USERNAME)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Cache root directory (overrides SHOWCASE_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Cache TTL in seconds (overrides SHOWCASE_CACHE_TTL_SECS)
    #[arg(long, global = true)]
    ttl_secs: Option<u64>,

    /// Upstream request timeout in milliseconds (overrides SHOWCASE_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides SHOWCASE_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides SHOWCASE_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fetch the project feed once and print it
    Fetch,
    /// Inspect or maintain the repository cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show the cached entry for the configured account
    Info,
    /// Remove every entry
    Clear,
    /// Remove expired and malformed entries
    Cleanup,
}

impl Cli {
    /// CLI value standing in for an environment variable, if given.
    fn override_for(&self, name: &str) -> Option<String> {
        match (name, &self.command) {
            ("GITHUB_USERNAME", _) => self.username.clone(),
            ("SHOWCASE_CACHE_DIR", _) => self.cache_dir.as_ref().map(|d| d.display().to_string()),
            ("SHOWCASE_CACHE_TTL_SECS", _) => self.ttl_secs.map(|s| s.to_string()),
            ("SHOWCASE_TIMEOUT_MS", _) => self.timeout_ms.map(|ms| ms.to_string()),
            ("SHOWCASE_HOST", Commands::Serve { host, .. }) => host.clone(),
            ("SHOWCASE_PORT", Commands::Serve { port, .. }) => port.map(|p| p.to_string()),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json);

    let config =
        Config::from_lookup(|name| cli.override_for(name).or_else(|| std::env::var(name).ok()))?;

    match cli.command {
        Commands::Serve { .. } => showcase::api::start(&config).await?,
        Commands::Fetch => {
            let feed = ProjectFeed::from_config(&config)?;
            let response = feed.fetch().await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Cache { action } => {
            let feed = ProjectFeed::from_config(&config)?;
            match action {
                CacheAction::Info => {
                    let status = CacheStatus::from(feed.cache_info());
                    println!("{}", serde_json::to_string_pretty(&status)?);
                }
                CacheAction::Clear => {
                    println!("Removed {} cache entries", feed.cache().clear());
                }
                CacheAction::Cleanup => {
                    println!("Removed {} expired or malformed entries", feed.cache().cleanup());
                }
            }
        }
    }

    Ok(())
}

fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("showcase=info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}
