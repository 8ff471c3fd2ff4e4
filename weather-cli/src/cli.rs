use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use tracing::{error, info};
use weather_core::{Config, Units, WeatherSearch, config::API_KEY_ENV};

use crate::render;

const SEARCH_PROMPT: &str = "Search by city || country:";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Defaults to `search` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and lookup defaults.
    Configure,

    /// Show current weather for an address.
    Show {
        /// City or country, e.g. "London,GB".
        address: String,
    },

    /// Interactive search, starting with the configured default location.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Search) {
            Command::Configure => configure(),
            Command::Show { address } => show(&address).await,
            Command::Search => interactive().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    cfg.set_api_key(api_key);

    let location = Text::new("Default location:")
        .with_default(&cfg.default_location)
        .prompt()?;
    cfg.default_location = location;

    let start = Units::all().iter().position(|u| *u == cfg.units).unwrap_or(0);
    cfg.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    if std::env::var(API_KEY_ENV).is_ok() {
        println!("Note: {API_KEY_ENV} is set and takes precedence over the saved key.");
    }

    Ok(())
}

async fn show(address: &str) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let mut search = WeatherSearch::from_config(&cfg)?;
    search.submit(address)?;

    let snap = search.manager().settled().await;
    render::print_snapshot(&snap);

    match snap.error() {
        Some(err) => {
            error!(error_id = %err.id(), address, "weather lookup failed");
            Err(anyhow!("Weather lookup failed: {err}"))
        }
        None => Ok(()),
    }
}

async fn interactive() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let mut search = WeatherSearch::from_config(&cfg)?;
    search
        .start(&cfg.default_location)
        .context("Configured default location is empty")?;

    'session: loop {
        let snap = search.manager().settled().await;
        render::print_snapshot(&snap);

        // Hold the prompt back until the error highlight has faded.
        if snap.error_visible {
            let faded = search.manager().error_dismissed().await;
            render::print_snapshot(&faded);
        }

        loop {
            let Some(input) = prompt_line().await? else {
                break 'session;
            };

            match search.submit(&input) {
                Ok(()) => break,
                Err(err) => render::print_validation(&err),
            }
        }
    }

    info!("interactive search closed");
    // Dropping `search` tears down anything still in flight.
    Ok(())
}

/// Read one line off the runtime threads; `None` when the user quits.
async fn prompt_line() -> anyhow::Result<Option<String>> {
    let answer = tokio::task::spawn_blocking(|| Text::new(SEARCH_PROMPT).prompt())
        .await
        .context("Prompt task failed")?;

    match answer {
        Ok(line) => Ok(Some(line)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
