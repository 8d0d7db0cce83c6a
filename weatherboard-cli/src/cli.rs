use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use weatherboard_core::{
    Config, CountryCode, DashboardController, GeocoderId, Outcome, PlaceQuery, RegionCatalog,
};

use crate::{prompt, render::TerminalRenderer};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherboard", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pick the default geocoder, default country and an optional fixed device position.
    Configure,

    /// Show the forecast for a place.
    Show {
        /// Place name, e.g. "Paris" or "New York".
        #[arg(required = true, num_args = 1..)]
        place: Vec<String>,

        /// Restrict the search to one country (ISO code, e.g. FR).
        #[arg(long, conflicts_with = "pick_country")]
        country: Option<String>,

        /// Choose the country interactively from the region list.
        #[arg(long)]
        pick_country: bool,

        /// Geocoder to use instead of the configured default.
        #[arg(long)]
        geocoder: Option<String>,
    },

    /// Show the forecast for where you are (device position, else IP lookup).
    Local,

    /// List the continents and countries offered by the pickers.
    Regions,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        self.run_with(Config::load).await
    }

    /// Only the commands that need the config call `load_config`.
    async fn run_with(
        self,
        load_config: impl FnOnce() -> anyhow::Result<Config>,
    ) -> anyhow::Result<ExitCode> {
        let catalog = RegionCatalog::builtin()?;

        match self.command {
            Command::Configure => {
                configure(load_config()?, &catalog)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show {
                place,
                country,
                pick_country,
                geocoder,
            } => {
                let config = load_config()?;
                let geocoder = geocoder
                    .as_deref()
                    .map(GeocoderId::try_from)
                    .transpose()?;

                let country = if let Some(code) = country {
                    Some(CountryCode::try_from(code.as_str())?)
                } else if pick_country {
                    Some(prompt::pick_country(&catalog)?)
                } else {
                    config.default_country_code()?
                };

                let mut query = PlaceQuery::new(place.join(" "));
                if let Some(cc) = country {
                    query = query.in_country(cc);
                }

                let dashboard = DashboardController::from_config(
                    &config,
                    geocoder,
                    TerminalRenderer::stdout(),
                )?;
                Ok(exit_code(dashboard.search(&query).await))
            }
            Command::Local => {
                let config = load_config()?;
                let dashboard =
                    DashboardController::from_config(&config, None, TerminalRenderer::stdout())?;
                Ok(exit_code(dashboard.load_local().await))
            }
            Command::Regions => {
                for continent in &catalog.continents {
                    println!("{}", continent.name);
                    for country in &continent.countries {
                        println!("  {}  {}", country.code, country.name);
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn configure(mut config: Config, catalog: &RegionCatalog) -> anyhow::Result<()> {
    let geocoder = prompt::pick_geocoder(config.default_geocoder_id().ok())?;
    config.set_default_geocoder(geocoder);

    let country = prompt::maybe_pick_country(catalog)?;
    config.set_default_country(country);

    config.device_position = prompt::maybe_device_position(config.device_position)?;

    config.save().context("Failed to save configuration")?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());

    Ok(())
}

fn exit_code(outcome: Outcome) -> ExitCode {
    match outcome {
        Outcome::Rendered(_) => ExitCode::SUCCESS,
        Outcome::NotFound | Outcome::Failed(_) | Outcome::Superseded => ExitCode::FAILURE,
    }
}
