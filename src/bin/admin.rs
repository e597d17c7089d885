//! CLI administration tool for kv-shortener.
//!
//! Works directly against the configured store, without going through the
//! HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a short link
//! cargo run --bin admin -- shorten https://example.com
//!
//! # Create a short link with a custom code and expiry
//! cargo run --bin admin -- shorten https://example.com --code promo --expires-at 2030-01-01T00:00:00Z
//!
//! # Inspect a code
//! cargo run --bin admin -- info promo
//!
//! # Check store connectivity
//! cargo run --bin admin -- store check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server (`REDIS_URL`, `STORE_BACKEND`, `CODE_LENGTH`, ...).
//! `BASE_URL` is used to print full short URLs.

use kv_shortener::application::services::UrlService;
use kv_shortener::config::{self, Config, mask_connection_string};
use kv_shortener::domain::entities::Expiry;
use kv_shortener::server::connect_store;
use kv_shortener::utils::url_validator::validate_url;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;

/// CLI tool for managing kv-shortener.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Create a short link
    Shorten {
        /// URL to shorten
        url: String,

        /// Custom short code
        #[arg(short, long)]
        code: Option<String>,

        /// Expiry timestamp (RFC 3339, e.g. 2030-01-01T00:00:00Z)
        #[arg(short, long, conflicts_with = "no_expiry")]
        expires_at: Option<DateTime<Utc>>,

        /// Create a link without expiry (requires ALLOW_PERSISTENT_LINKS)
        #[arg(long)]
        no_expiry: bool,
    },

    /// Show a mapping and its visit count
    Info {
        /// Short code
        code: String,
    },

    /// Store operations
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

/// Store operation subcommands.
#[derive(Subcommand)]
enum StoreAction {
    /// Check store connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let store = connect_store(&config).await?;
    let service = UrlService::new(store, config.service_settings());

    match cli.command {
        Commands::Shorten {
            url,
            code,
            expires_at,
            no_expiry,
        } => {
            let expiry = match (expires_at, no_expiry) {
                (Some(at), _) => Expiry::At(at),
                (None, true) => Expiry::Never,
                (None, false) => Expiry::Default,
            };
            shorten(&service, &config, url, code, expiry).await?
        }
        Commands::Info { code } => info(&service, &config, &code).await?,
        Commands::Store {
            action: StoreAction::Check,
        } => check_store(&service, &config).await?,
    }

    Ok(())
}

/// Public URL for a code, or the bare code when no `BASE_URL` is set.
fn display_url(config: &Config, code: &str) -> String {
    match &config.base_url {
        Some(base) => format!("{}/{}", base, code),
        None => code.to_string(),
    }
}

fn format_time(ts: Option<DateTime<Utc>>, missing: &str) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| missing.to_string())
}

/// Creates a short link and prints its details.
async fn shorten(
    service: &UrlService,
    config: &Config,
    url: String,
    code: Option<String>,
    expiry: Expiry,
) -> Result<()> {
    println!("{}", "Create short link".bright_blue().bold());
    println!();

    let long_url = validate_url(&url).context("Invalid URL")?;
    let mapping = service
        .create_short_url(long_url, code, expiry)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create short link: {}", e))?;

    println!("  Code:     {}", mapping.code.as_str().bright_yellow().bold());
    println!(
        "  URL:      {}",
        display_url(config, mapping.code.as_str()).cyan()
    );
    println!("  Target:   {}", mapping.long_url);
    println!(
        "  Expires:  {}",
        format_time(mapping.expires_at, "never").bright_black()
    );
    println!();
    println!("{}", "Short link created".green().bold());

    Ok(())
}

/// Prints a mapping and its visit count.
async fn info(service: &UrlService, config: &Config, code: &str) -> Result<()> {
    println!("{}", "Link info".bright_blue().bold());
    println!();

    let info = match service.get_url(code).await {
        Ok(info) => info,
        Err(e) => {
            println!("  {}", e.to_string().red());
            return Ok(());
        }
    };

    println!("  Code:     {}", info.mapping.code.as_str().bright_yellow());
    println!(
        "  URL:      {}",
        display_url(config, info.mapping.code.as_str()).cyan()
    );
    println!("  Target:   {}", info.mapping.long_url);
    println!(
        "  Visits:   {}",
        info.visits.to_string().bright_white().bold()
    );
    println!(
        "  Created:  {}",
        format_time(info.mapping.created_at, "unknown").bright_black()
    );
    println!(
        "  Expires:  {}",
        format_time(info.mapping.expires_at, "never").bright_black()
    );
    println!();

    Ok(())
}

/// Pings the store.
async fn check_store(service: &UrlService, config: &Config) -> Result<()> {
    println!("{}", "Checking store connection".bright_blue().bold());
    println!();
    println!("  Backend:  {}", config.store_backend.to_string().cyan());
    println!(
        "  Address:  {}",
        mask_connection_string(&config.redis_url).bright_black()
    );
    println!();

    if service.health().await {
        println!("{}", "Store connection OK".green().bold());
        Ok(())
    } else {
        println!("{}", "Store connection failed".red().bold());
        anyhow::bail!("store did not answer PING")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_shorten_with_options() {
        let cli = Cli::parse_from([
            "admin",
            "shorten",
            "https://example.com",
            "--code",
            "promo",
            "--expires-at",
            "2030-01-01T00:00:00Z",
        ]);

        match cli.command {
            Commands::Shorten {
                url,
                code,
                expires_at,
                no_expiry,
            } => {
                assert_eq!(url, "https://example.com");
                assert_eq!(code.as_deref(), Some("promo"));
                assert!(expires_at.is_some());
                assert!(!no_expiry);
            }
            _ => panic!("expected shorten command"),
        }
    }

    #[test]
    fn test_expiry_flags_conflict() {
        let result = Cli::try_parse_from([
            "admin",
            "shorten",
            "https://example.com",
            "--expires-at",
            "2030-01-01T00:00:00Z",
            "--no-expiry",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_store_check() {
        let cli = Cli::parse_from(["admin", "store", "check"]);
        assert!(matches!(
            cli.command,
            Commands::Store {
                action: StoreAction::Check
            }
        ));
    }
}
