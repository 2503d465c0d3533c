use anyhow::Context;
use clap::{Parser, Subcommand};

use citycast_core::{
    Config, Granularity, Metric, OpenWeatherClient, ViewState, fetch_now,
};

use crate::tui;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "citycast", version, about = "City forecast chart for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Look up a city and chart its forecast.
    Show {
        /// City name, e.g. "Kyiv".
        city: String,

        /// Metric to plot: temperature, pressure, humidity or wind.
        #[arg(long, default_value = "temperature")]
        metric: String,

        /// Sampling granularity: 3h or day.
        #[arg(long, default_value = "3h")]
        granularity: String,

        /// Print a table instead of opening the interactive chart.
        #[arg(long)]
        plain: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                metric,
                granularity,
                plain,
            } => {
                let metric = Metric::try_from(metric.as_str())?;
                let granularity = Granularity::try_from(granularity.as_str())?;

                let config = Config::resolve().context("Failed to resolve configuration")?;
                let provider = match config.require_api_key() {
                    Ok(key) => Some(OpenWeatherClient::new(key.to_string())?),
                    // surfaced as the error banner on first fetch
                    Err(_) => None,
                };

                let mut state = ViewState::new();
                state.city_input = city;
                state.metric = metric;
                state.granularity = granularity;

                if plain {
                    show_plain(state, provider).await
                } else {
                    tui::run(state, provider).await
                }
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load().context("Failed to load existing configuration")?;

    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Configuration aborted")?;

    config.api_key = Some(key);
    config.save().context("Failed to save configuration")?;

    println!(
        "Saved. Config file: {}",
        Config::config_file_path()?.display()
    );
    println!("The {} environment variable overrides it.", citycast_core::config::API_KEY_ENV);
    Ok(())
}

async fn show_plain(
    mut state: ViewState,
    provider: Option<OpenWeatherClient>,
) -> anyhow::Result<()> {
    fetch_now(&mut state, provider.as_ref()).await;

    if let Some(message) = state.error {
        anyhow::bail!("{message}");
    }

    let series = state
        .series
        .ok_or_else(|| anyhow::anyhow!("No forecast data returned"))?;

    println!(
        "Forecast for {} ({} points, {} granularity, fetched {})",
        series.city_name,
        series.points.len(),
        state.granularity,
        series.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    println!(
        "{:<20} {:>10} {:>10} {:>9} {:>9}",
        "Timestamp", "Temp °C", "hPa", "Hum %", "Wind m/s"
    );
    for point in &series.points {
        println!(
            "{:<20} {:>10.1} {:>10.1} {:>9.0} {:>9.1}",
            point.timestamp, point.temperature, point.pressure, point.humidity, point.wind_speed
        );
    }

    Ok(())
}
