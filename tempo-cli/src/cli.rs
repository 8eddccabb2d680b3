use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::Password;
use tempo_core::{Config, Coordinates, WeatherController, provider::provider_from_config};

use crate::output::TerminalObserver;

/// City shown when none is given.
const DEFAULT_CITY: &str = "São Paulo";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "tempo", version, about = "Current weather from OpenWeather")]
pub struct Cli {
    /// Log request details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for a city.
    City {
        /// City name, e.g. "Porto Alegre".
        name: Vec<String>,
    },

    /// Show current weather for a coordinate pair.
    Coords {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::City { name } => {
                let city = if name.is_empty() { DEFAULT_CITY.to_string() } else { name.join(" ") };
                let observer = TerminalObserver::default();
                controller()?.fetch_weather(&city, &observer).await;
                observer.finish()
            }
            Command::Coords { latitude, longitude } => {
                let observer = TerminalObserver::default();
                controller()?
                    .fetch_weather_at(Coordinates::new(latitude, longitude), &observer)
                    .await;
                observer.finish()
            }
        }
    }
}

fn controller() -> anyhow::Result<WeatherController> {
    let config = Config::load()?;
    tracing::debug!(base_url = ?config.base_url, "loaded configuration");
    let provider = provider_from_config(&config)?;
    Ok(WeatherController::new(Arc::from(provider)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key.trim().to_string());
    config.api_key()?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
