use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::sync::watch;
use tracing::info;

use tweetsentry::classify::account::inspect_account;
use tweetsentry::config::{parse_interval, Config, DEFAULT_INTERVAL_SECS};
use tweetsentry::output::terminal;
use tweetsentry::twitter::client::TwitterClient;
use tweetsentry::twitter::users::normalize_handle;
use tweetsentry::watch::poller::{classify_until_settled, relay_interrupts, Watcher};

/// TweetSentry: watch a Twitter/X account for new posts.
///
/// Classifies the account (public, private, verified, withheld, sensitive,
/// banned) and then polls its timeline until interrupted.
#[derive(Parser)]
#[command(name = "tweetsentry", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch an account for new tweets (prompts when no handle is given)
    Watch {
        /// The handle to watch, with or without @
        handle: Option<String>,

        /// Seconds between checks (default: 180, or TWEETSENTRY_INTERVAL)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show an account's current status and exit
    Status {
        /// The handle to check, with or without @
        handle: String,
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
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tweetsentry=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { handle, interval } => {
            let config = Config::load()?;
            config.require_bearer()?;

            // Interactive mode: ask for both values when no handle was given
            let interactive = handle.is_none();
            let handle = match handle {
                Some(handle) => handle,
                None => prompt("Enter the Twitter/X username to watch (without @): ")?,
            };
            let handle = normalize_handle(&handle)?;

            let interval = match interval {
                Some(secs) if secs > 0 => Some(secs),
                Some(_) => {
                    println!(
                        "{}",
                        format!("Invalid interval, using default: {DEFAULT_INTERVAL_SECS} seconds")
                            .yellow()
                    );
                    Some(DEFAULT_INTERVAL_SECS)
                }
                None if interactive => prompt_interval(&config)?,
                None => None,
            };
            let settings = config.watch_settings(interval);

            let client = TwitterClient::new(&config.api_url, &config.bearer_token)?;

            // Ctrl-C flips the shutdown flag; the loop notices between cycles.
            // A second Ctrl-C exits without waiting for the current request.
            let (shutdown_tx, mut shutdown) = watch::channel(false);
            tokio::spawn(async move {
                if relay_interrupts(tokio::signal::ctrl_c, shutdown_tx).await {
                    eprintln!("\n{}", "Interrupted again, exiting now.".yellow());
                    std::process::exit(130);
                }
            });

            println!("{}", format!("Starting to watch @{handle}'s tweets...").cyan());

            let report =
                match classify_until_settled(&client, &handle, &settings, &mut shutdown).await {
                    Ok(Some(report)) => report,
                    Ok(None) => {
                        println!("\n{}", "Stopping tweet watcher...".cyan());
                        return Ok(());
                    }
                    Err(e) => {
                        terminal::display_watch_refused(&e);
                        return Ok(());
                    }
                };

            terminal::display_account(&report);

            let mut watcher = match Watcher::begin(&client, report, settings) {
                Ok(watcher) => watcher,
                Err(e) => {
                    terminal::display_watch_refused(&e);
                    return Ok(());
                }
            };

            let cycles = watcher
                .run(&mut shutdown, terminal::display_watch_event)
                .await;

            info!(cycles = cycles, "Watch finished");
            println!("\n{}", "Stopping tweet watcher...".cyan());
        }

        Commands::Status { handle } => {
            let config = Config::load()?;
            config.require_bearer()?;
            let handle = normalize_handle(&handle)?;

            let client = TwitterClient::new(&config.api_url, &config.bearer_token)?;

            match inspect_account(&client, &handle, config.sample_size).await {
                Ok(report) => terminal::display_account(&report),
                Err(e) => terminal::display_classification_error(&handle, &e),
            }
        }
    }

    Ok(())
}

/// Print a prompt and read one trimmed line from stdin.
fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Ask for an interval. Blank keeps the configured one; garbage warns and
/// falls back to the default.
fn prompt_interval(config: &Config) -> Result<Option<u64>> {
    let raw = prompt(&format!(
        "Enter check interval in seconds (default: {}): ",
        config.interval_secs
    ))?;

    if raw.is_empty() {
        return Ok(None);
    }

    match parse_interval(&raw) {
        Some(secs) => Ok(Some(secs)),
        None => {
            println!(
                "{}",
                format!("Invalid interval, using default: {DEFAULT_INTERVAL_SECS} seconds").yellow()
            );
            Ok(Some(DEFAULT_INTERVAL_SECS))
        }
    }
}
