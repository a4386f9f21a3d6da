use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Text};
use weather_core::{Config, SearchOutcome, WeatherSearchController, provider_from_config};

use crate::output::{TerminalNotifier, print_snapshot};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather search CLI")]
pub struct Cli {
    /// Log debug output to stderr.
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
    Show {
        /// City name, e.g. "London".
        city: String,
    },

    /// Search repeatedly from an interactive prompt.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
            Command::Search => search_loop().await,
        }
    }
}

fn configure() -> anyhow::Result<ExitCode> {
    let mut cfg = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    cfg.set_api_key(api_key.to_string());
    let path = cfg.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(ExitCode::SUCCESS)
}

fn controller() -> anyhow::Result<WeatherSearchController> {
    let cfg = Config::load()?;
    let provider = provider_from_config(&cfg)?;
    Ok(WeatherSearchController::new(provider, Box::new(TerminalNotifier)))
}

async fn show(city: &str) -> anyhow::Result<ExitCode> {
    let controller = controller()?;

    let outcome = controller.submit_search(city).await;
    print_snapshot(controller.snapshot().as_ref());

    Ok(match outcome {
        SearchOutcome::Found(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

async fn search_loop() -> anyhow::Result<ExitCode> {
    let controller = controller()?;

    println!("Weather Search - check weather anywhere (Esc to quit)");
    loop {
        let input = Text::new("City:")
            .with_placeholder("Enter city name")
            .with_initial_value(&controller.state().query)
            .prompt();

        let text = match input {
            Ok(text) => text,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err).context("Failed to read city name"),
        };

        controller.edit_query(text);
        eprintln!("Loading...");
        controller.submit().await;
        print_snapshot(controller.snapshot().as_ref());
    }

    Ok(ExitCode::SUCCESS)
}
