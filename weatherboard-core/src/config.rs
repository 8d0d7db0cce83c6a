use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    forecast::OPEN_METEO_FORECAST_URL,
    geocoder::{
        GeocoderId, nominatim::NOMINATIM_URL, open_meteo::OPEN_METEO_GEOCODING_URL,
    },
    http::DEFAULT_USER_AGENT,
    locate::{DEFAULT_DEVICE_WAIT, IPAPI_URL},
    model::{Coordinates, CountryCode},
};

/// Base URLs of the external services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Endpoints {
    pub forecast: String,
    pub nominatim: String,
    pub open_meteo_geocoding: String,
    pub ip_location: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: OPEN_METEO_FORECAST_URL.to_string(),
            nominatim: NOMINATIM_URL.to_string(),
            open_meteo_geocoding: OPEN_METEO_GEOCODING_URL.to_string(),
            ip_location: IPAPI_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Geocoder id, "nominatim" or "open-meteo". Nominatim when unset.
    pub default_geocoder: Option<String>,

    /// Country filter applied to searches that don't name one, e.g. "FR".
    pub default_country: Option<String>,

    pub user_agent: Option<String>,

    /// How long to wait for the device sensor before asking the IP locator.
    pub location_timeout_ms: Option<u64>,

    /// Off unless set: requests otherwise wait as long as the server takes.
    pub request_timeout_secs: Option<u64>,

    /// Example TOML:
    /// [device_position]
    /// latitude = 48.85
    /// longitude = 2.35
    pub device_position: Option<Coordinates>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Return the default geocoder as a strongly-typed GeocoderId.
    pub fn default_geocoder_id(&self) -> Result<GeocoderId> {
        match self.default_geocoder.as_deref() {
            None => Ok(GeocoderId::Nominatim),
            Some(s) => GeocoderId::try_from(s),
        }
    }

    pub fn set_default_geocoder(&mut self, id: GeocoderId) {
        self.default_geocoder = Some(id.as_str().to_string());
    }

    /// The configured default country filter, if any.
    pub fn default_country_code(&self) -> Result<Option<CountryCode>> {
        self.default_country
            .as_deref()
            .map(CountryCode::try_from)
            .transpose()
            .context("Invalid `default_country` in config")
    }

    pub fn set_default_country(&mut self, country: Option<CountryCode>) {
        self.default_country = country.map(String::from);
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn location_timeout(&self) -> Duration {
        self.location_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEVICE_WAIT)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherboard", "weatherboard")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
