use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::SourceError,
    geocoder::CANDIDATE_LIMIT,
    http::get_json,
    model::{CountryCode, PlaceCandidate},
};

use super::Geocoder;

pub const OPEN_METEO_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const SERVICE: &str = "open-meteo geocoding";

#[derive(Debug, Clone)]
pub struct OpenMeteoGeocoder {
    http: Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmSearchResponse {
    // Absent entirely when nothing matched.
    #[serde(default)]
    results: Vec<OmPlace>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    #[serde(default)]
    country: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl From<OmPlace> for PlaceCandidate {
    fn from(place: OmPlace) -> Self {
        PlaceCandidate {
            name: place.name,
            country: place.country.unwrap_or_default(),
            latitude: place.latitude,
            longitude: place.longitude,
        }
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(
        &self,
        text: &str,
        country: Option<&CountryCode>,
    ) -> Result<Vec<PlaceCandidate>, SourceError> {
        let mut query = vec![
            ("name", text.to_string()),
            ("count", CANDIDATE_LIMIT.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        if let Some(cc) = country {
            query.push(("countryCode", cc.to_string()));
        }

        let parsed: OmSearchResponse =
            get_json(&self.http, SERVICE, &self.base_url, &query).await?;

        Ok(parsed.results.into_iter().map(PlaceCandidate::from).collect())
    }
}
