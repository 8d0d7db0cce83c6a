use async_trait::async_trait;
use reqwest::Client;
use std::{convert::TryFrom, fmt::Debug};

use crate::{
    Config,
    error::SourceError,
    geocoder::{nominatim::NominatimGeocoder, open_meteo::OpenMeteoGeocoder},
    model::{CountryCode, PlaceCandidate},
};

pub mod nominatim;
pub mod open_meteo;

/// How many candidates to ask for; only the first is used, the rest are logged.
pub(crate) const CANDIDATE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeocoderId {
    Nominatim,
    OpenMeteo,
}

impl GeocoderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeocoderId::Nominatim => "nominatim",
            GeocoderId::OpenMeteo => "open-meteo",
        }
    }

    pub const fn all() -> &'static [GeocoderId] {
        &[GeocoderId::Nominatim, GeocoderId::OpenMeteo]
    }
}

impl std::fmt::Display for GeocoderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for GeocoderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "nominatim" => Ok(GeocoderId::Nominatim),
            "open-meteo" | "openmeteo" => Ok(GeocoderId::OpenMeteo),
            _ => Err(anyhow::anyhow!(
                "Unknown geocoder '{value}'. Supported geocoders: nominatim, open-meteo."
            )),
        }
    }
}

/// Free-text place search. Candidates come back in the service's own order.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn search(
        &self,
        text: &str,
        country: Option<&CountryCode>,
    ) -> Result<Vec<PlaceCandidate>, SourceError>;
}

/// Construct a geocoder from config and explicit GeocoderId.
pub fn geocoder_from_config(id: GeocoderId, config: &Config, http: Client) -> Box<dyn Geocoder> {
    match id {
        GeocoderId::Nominatim => Box::new(NominatimGeocoder::new(
            http,
            config.endpoints.nominatim.clone(),
        )),
        GeocoderId::OpenMeteo => Box::new(OpenMeteoGeocoder::new(
            http,
            config.endpoints.open_meteo_geocoding.clone(),
        )),
    }
}

/// Construct the default geocoder from config, using `default_geocoder` field.
pub fn default_geocoder_from_config(
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn Geocoder>> {
    let id = config.default_geocoder_id()?;
    Ok(geocoder_from_config(id, config, http))
}
