//! # Command Line Interface
//!
//! Provides CLI commands for creating notes, opening note URLs, and probing
//! the health of every configured store.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::AppConfig;
use crate::note::{NoteService, NoteUrl, StoreFamily};

#[derive(Parser)]
#[command(name = "sealnote")]
#[command(about = "Ephemeral encrypted notes with read-decay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encrypt a note and print its one-time URL
    Create {
        /// Plaintext to seal
        text: String,

        /// Seconds until the note expires unread
        #[arg(long)]
        ttl: Option<u64>,

        /// How many reads the note survives
        #[arg(long)]
        reads: Option<u32>,

        /// Store family to write through
        #[arg(long, default_value = "direct")]
        store: String,
    },

    /// Open a note URL and print its plaintext
    Open {
        /// The note:// URL including the secret fragment
        url: String,

        /// Store family to read through
        #[arg(long, default_value = "direct")]
        store: String,
    },

    /// Probe every configured store and report its health
    Health,
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    initialise_logging(cli.verbose)?;

    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Create { text, ttl, reads, store } => {
            let service = NoteService::from_config(&config, parse_store_family(&store)?)?;
            let ttl = ttl.unwrap_or_else(|| service.default_ttl_seconds());
            let reads = reads.unwrap_or_else(|| service.default_max_reads());

            let url = service.create_note(&text, ttl, reads).await?;
            println!("{}", url);
        }

        Commands::Open { url, store } => {
            let parsed = NoteUrl::parse(&url)?;
            let service = NoteService::from_config(&config, parse_store_family(&store)?)?;

            let plaintext = service.open_note(&parsed).await?;
            println!("{}", plaintext);
        }

        Commands::Health => handle_health_command(&config).await?,
    }

    Ok(())
}

/// Parse a store family name from the command line
fn parse_store_family(s: &str) -> anyhow::Result<StoreFamily> {
    match s.to_lowercase().as_str() {
        "direct" => Ok(StoreFamily::Direct),
        "rest" => Ok(StoreFamily::Rest),
        _ => anyhow::bail!("Unsupported store family: '{}'. Use 'direct' or 'rest'.", s),
    }
}

/// Probe both store families and print one line per store
async fn handle_health_command(config: &AppConfig) -> anyhow::Result<()> {
    let mut all_healthy = true;

    let direct = NoteService::from_config(config, StoreFamily::Direct)?;
    report_family(&direct, &mut all_healthy).await;

    if config.rest.is_some() {
        let rest = NoteService::from_config(config, StoreFamily::Rest)?;
        report_family(&rest, &mut all_healthy).await;
    }

    if !all_healthy {
        std::process::exit(1);
    }
    Ok(())
}

async fn report_family(service: &NoteService, all_healthy: &mut bool) {
    for (location, healthy) in service.probe_stores().await {
        if healthy {
            println!("✅ {:<6} {}", service.family().as_str(), location);
        } else {
            println!("❌ {:<6} {}", service.family().as_str(), location);
            *all_healthy = false;
        }
    }
}

fn initialise_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", default_level);
    }

    if tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish(),
    )
    .is_err()
    {
        // Subscriber already set elsewhere (e.g. integration tests); ignore.
    }
    Ok(())
}
