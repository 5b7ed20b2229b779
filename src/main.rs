use anyhow::{Context, Result};
use castpromo::commands::{self, PromoFlags};
use castpromo::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "castpromo", about = "Promote podcast episodes once their transcripts are published")]
#[command(version)]
struct Cli {
    /// Path to config.yaml
    #[arg(short, long, default_value = "config.yaml", env = "CASTPROMO_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and post promos for recent episodes with transcripts
    Promo {
        /// Print promos without posting or updating state
        #[arg(long)]
        dry_run: bool,
        /// Ignore promotion state and promote every eligible episode
        #[arg(long)]
        force: bool,
        /// Use the template instead of the AI tier
        #[arg(long)]
        no_ai: bool,
        /// Skip the forum channel
        #[arg(long)]
        no_discourse: bool,
        /// Skip the microblog channel
        #[arg(long)]
        no_mastodon: bool,
        /// Number of recent episodes to consider
        #[arg(long)]
        count: Option<usize>,
    },
    /// Summarize the latest episode transcript with the AI backend
    Summarize {
        /// Specific episode id instead of the latest
        #[arg(long)]
        episode_id: Option<String>,
    },
    /// List active shows
    Shows {
        /// Ignore the cached listing
        #[arg(long)]
        refresh: bool,
    },
    /// Print the transcript URLs probed for an episode
    Candidates {
        show_slug: String,
        show_label: String,
        episode_number: String,
        /// Fetch each candidate and report whether it validates
        #[arg(long)]
        probe: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Promo {
            dry_run,
            force,
            no_ai,
            no_discourse,
            no_mastodon,
            count,
        } => {
            let flags = PromoFlags {
                dry_run,
                force,
                no_ai,
                no_discourse,
                no_mastodon,
                count,
            };
            commands::promo(config, flags)
                .await
                .context("Promotion run failed")?;
        }
        Commands::Summarize { episode_id } => {
            commands::summarize(config, episode_id)
                .await
                .context("Summarization failed")?;
        }
        Commands::Shows { refresh } => {
            commands::shows(config, refresh)
                .await
                .context("Failed to list shows")?;
        }
        Commands::Candidates {
            show_slug,
            show_label,
            episode_number,
            probe,
        } => {
            commands::candidates(config, &show_slug, &show_label, &episode_number, probe).await?;
        }
    }
    Ok(())
}
