use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, ForecastController, Location, config::parse_locale, provider_from_config,
};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::debug;

use crate::render::render;

const QUIT_COMMAND: &str = ":quit";
const THEME_COMMAND: &str = ":theme";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Current conditions and a seven-day outlook")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, default location and locale.
    Configure,

    /// Show the forecast for a location once.
    Show {
        /// Location name; defaults to the configured location.
        location: Option<String>,
    },

    /// Prompt for locations repeatedly (`:theme` toggles the theme, `:quit` exits).
    Interactive,

    /// Toggle between the light and dark theme.
    Theme,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config)?,
            Command::Show { location } => {
                let raw = location.unwrap_or_else(|| config.default_location.clone());
                let controller = controller_from_config(&config)?;
                controller.submit(&raw).await?;
                println!("{}", render(&controller.snapshot(), config.theme));
            }
            Command::Interactive => interactive(&mut config).await?,
            Command::Theme => {
                config.theme = config.theme.toggle();
                config.save()?;
                println!("Theme set to {}", config.theme);
            }
        }

        Ok(())
    }
}

fn controller_from_config(config: &Config) -> anyhow::Result<ForecastController> {
    let provider = provider_from_config(config)?;
    Ok(ForecastController::new(Arc::new(provider), config.locale()?))
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let location = Text::new("Default location:")
        .with_default(&config.default_location)
        .prompt()
        .context("Failed to read default location")?;
    config.default_location = Location::parse(&location)?.to_string();

    let locale = Text::new("Locale:")
        .with_default(&config.locale)
        .prompt()
        .context("Failed to read locale")?;
    parse_locale(&locale)?;
    config.locale = locale.trim().to_string();

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}

async fn interactive(config: &mut Config) -> anyhow::Result<()> {
    let controller = controller_from_config(config)?;
    controller.submit(&config.default_location).await?;
    println!("{}", render(&controller.snapshot(), config.theme));

    loop {
        let input = Text::new("Location:")
            .with_help_message(":theme toggles the theme, :quit exits")
            .prompt()
            .context("Failed to read location")?;

        match input.trim() {
            "" => continue,
            QUIT_COMMAND => break,
            THEME_COMMAND => {
                config.theme = config.theme.toggle();
                config.save()?;
            }
            raw => {
                controller.submit(raw).await?;
            }
        }

        let state = controller.snapshot();
        if let Some(location) = state.location.clone().filter(|_| state.needs_fetch()) {
            debug!(location = %location, "re-fetching after discarded response");
            controller.fetch(location).await;
        }

        println!("{}", render(&controller.snapshot(), config.theme));
    }

    Ok(())
}
