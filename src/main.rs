use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use retootbot::config::Config;
use retootbot::db::Store;
use retootbot::mastodon::client::MastodonClient;
use retootbot::pipeline::{poll, ReshareCoordinator};

/// retootbot: reshare Mastodon posts on command.
///
/// Mention the bot with "this" or "rt" to have it boost your post, or reply
/// to someone else's post with "parent" to have it boost theirs.
#[derive(Parser)]
#[command(name = "retootbot", version, about)]
struct Cli {
    /// JSON config file (otherwise settings come from the environment / .env)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Poll for mentions until interrupted
    Run,

    /// Poll once and exit
    Poll,

    /// Show the watermark and recently handled posts
    Status,

    /// Print the command the bot would read from a message body
    Classify {
        /// Message body (HTML as the server sends it, or plain text)
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("retootbot=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Init => {
            info!("Initializing retootbot database...");
            let store = init_store(&config)?;
            let table_count = store.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables: {table_count}");
            println!("Watermark: {}", store.watermark().await?);
            println!("\nNext: set RETOOTBOT_API_BASE_URL, RETOOTBOT_ACCESS_TOKEN and");
            println!("RETOOTBOT_LOCAL_HANDLE in your .env, then run: retootbot run");
        }

        Commands::Run => {
            config.require_server()?;
            let coordinator = build_coordinator(&config)?;
            poll::run(&coordinator, config.poll_interval()).await?;
        }

        Commands::Poll => {
            config.require_server()?;
            let coordinator = build_coordinator(&config)?;
            let summary = coordinator.tick().await?;
            println!(
                "{} notifications, {} mentions, {} reshared, {} skipped",
                summary.notifications, summary.mentions, summary.reshared, summary.skipped
            );
            println!("Watermark: {}", summary.watermark);
        }

        Commands::Status => {
            let store = retootbot::db::open_sqlite(&config.db_path, config.db_busy_timeout());
            match store {
                Ok(store) => retootbot::status::show(&store, &config.db_path).await?,
                Err(_) => {
                    println!("Database: not initialized");
                    println!("\nRun `retootbot init` to set up the database.");
                }
            }
        }

        Commands::Classify { text } => {
            config.require_handle()?;
            match config.classifier().classify(&text) {
                Some(command) => println!("{}", command.as_str().green().bold()),
                None => println!("{}", "no command".dimmed()),
            }
        }
    }

    Ok(())
}

/// Initialize the SQLite store (create if needed).
fn init_store(config: &Config) -> Result<Arc<dyn Store>> {
    retootbot::db::initialize_sqlite(&config.db_path, config.db_busy_timeout())
}

/// Wire the HTTP client, the store and the classifier together.
fn build_coordinator(config: &Config) -> Result<ReshareCoordinator> {
    let store = init_store(config)?;
    let client = MastodonClient::new(
        &config.api_base_url,
        &config.access_token,
        config.http_timeout(),
    )?;
    Ok(ReshareCoordinator::new(
        Arc::new(client),
        store,
        config.classifier(),
    ))
}
