//! # feed-cli
//!
//! Command line client for the photofeed API.
//!
//! ## Commands
//!
//! - `auth-url`: Print the authorization page URL
//! - `login`: Exchange an authorization code for a token
//! - `status`: Show configuration and sign-in state
//! - `profile`: Show the signed-in user's profile
//! - `feed`: List photos from the feed
//! - `like` / `unlike`: Change a photo's like flag
//! - `logout`: Forget the stored token
//!
//! ## Example
//!
//! ```bash
//! export PHOTOFEED_ACCESS_KEY=... PHOTOFEED_SECRET_KEY=...
//!
//! # Open the printed URL and approve the application
//! feed-cli auth-url
//!
//! # Paste the code shown after approval
//! feed-cli login --code 4f7b...
//!
//! feed-cli feed --pages 2
//! feed-cli like Dwu85P9SOIk
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{auth_url, feed, like, login, logout, profile, status};
use config::CliConfig;

/// Command line client for the photofeed API.
#[derive(Parser, Debug)]
#[command(name = "feed-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: config.toml in the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log requests and state changes to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the authorization page URL
    AuthUrl,

    /// Exchange an authorization code for a token
    Login {
        /// Code shown on the authorization page
        #[arg(long, conflicts_with = "redirect")]
        code: Option<String>,

        /// Full redirect URL containing the code
        #[arg(long, conflicts_with = "code")]
        redirect: Option<String>,
    },

    /// Show configuration and sign-in state
    Status,

    /// Show the signed-in user's profile
    Profile,

    /// List photos from the feed
    Feed {
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Like a photo
    Like {
        /// Photo id
        id: String,
    },

    /// Remove a like from a photo
    Unlike {
        /// Photo id
        id: String,
    },

    /// Forget the stored token
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?.with_env_overrides();

    match cli.command {
        Commands::AuthUrl => {
            auth_url::run(&config)?;
        }
        Commands::Login { code, redirect } => {
            let code = login::parse_code(code.as_deref(), redirect.as_deref())?;
            login::run(&config, code).await?;
        }
        Commands::Status => {
            status::run(&config)?;
        }
        Commands::Profile => {
            profile::run(&config).await?;
        }
        Commands::Feed { pages } => {
            feed::run(&config, pages).await?;
        }
        Commands::Like { id } => {
            like::run(&config, &id, true).await?;
        }
        Commands::Unlike { id } => {
            like::run(&config, &id, false).await?;
        }
        Commands::Logout => {
            logout::run(&config)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();
}
