use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use tracing::debug;
use weather_core::{
    Config, GeocodeResolver, ReqwestClient, SearchState, Units, WeatherFetcher, WeatherRecord,
    WeatherSession, config::API_KEY_ENV, display,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred units.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, letters only (e.g. "Springfield").
        city: String,

        /// "metric" or "imperial"; defaults to the configured units.
        #[arg(long)]
        units: Option<Units>,

        /// Directory holding condition icons named `<icon id>.png`.
        #[arg(long)]
        icons: Option<PathBuf>,
    },

    /// Search repeatedly until an empty city name or Esc.
    Interactive {
        #[arg(long)]
        units: Option<Units>,

        #[arg(long)]
        icons: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units, icons } => {
                let mut session = build_session(units)?;
                let state = search_and_choose(&mut session, &city).await?;
                match state {
                    SearchState::Displaying(record) => {
                        print_record(record, icons.as_ref());
                        Ok(())
                    }
                    SearchState::Error(err) => Err(anyhow!(err.user_message())),
                    other => Err(anyhow!("search ended in unexpected state '{}'", other.name())),
                }
            }
            Command::Interactive { units, icons } => {
                let mut session = build_session(units)?;
                interactive(&mut session, icons.as_ref()).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Find it under 'My API keys' in your OpenWeather account")
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.set_api_key(api_key.trim().to_string());

    let start = Units::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read units")?;

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn build_session(units: Option<Units>) -> anyhow::Result<WeatherSession> {
    let config = Config::load()?;
    let api_key = config.resolve_api_key(std::env::var(API_KEY_ENV).ok())?;

    let client = ReqwestClient::new(config.timeout()).context("Failed to build HTTP client")?;
    let http = Arc::new(client);
    let resolver = GeocodeResolver::new(http.clone(), config.endpoints.geocode, api_key.clone());
    let fetcher = WeatherFetcher::new(http, config.endpoints.weather, api_key);
    let units = units.unwrap_or(config.units);
    debug!(%units, "session ready");

    Ok(WeatherSession::new(resolver, fetcher, units))
}

/// Runs one search, prompting for a candidate when the name is ambiguous.
async fn search_and_choose<'a>(
    session: &'a mut WeatherSession,
    city: &str,
) -> anyhow::Result<&'a SearchState> {
    session.search(city).await;
    let labels = match session.state() {
        SearchState::Disambiguating(set) => set.labels(),
        _ => return Ok(session.state()),
    };

    let choice = Select::new("Several places match, pick one:", labels)
        .raw_prompt()
        .context("Failed to read selection")?;

    Ok(session.select(choice.index).await?)
}

async fn interactive(
    session: &mut WeatherSession,
    icons: Option<&PathBuf>,
) -> anyhow::Result<()> {
    println!("Current Weather");

    loop {
        let prompt = Text::new("City:").with_placeholder("Enter city name");
        let city = match prompt.prompt() {
            Ok(city) => city,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };
        if city.is_empty() {
            break;
        }

        match search_and_choose(session, &city).await {
            Ok(SearchState::Displaying(record)) => print_record(record, icons),
            Ok(SearchState::Error(err)) => eprintln!("{}\n", err.user_message()),
            Ok(_) => {}
            Err(err) => eprintln!("{err:#}\n"),
        }
        session.reset();
    }

    Ok(())
}

fn print_record(record: &WeatherRecord, icons: Option<&PathBuf>) {
    println!("{}", display::Report(record));
    if let Some(at) = record.observed_at {
        let local = at.with_timezone(&Local);
        println!("Observed {}", local.format("%Y-%m-%d %H:%M"));
    }
    if let Some(dir) = icons {
        println!("Icon {}", display::icon_path(record, dir).display());
    }
    println!();
}
