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

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const SERVICE: &str = "nominatim";

/// OpenStreetMap Nominatim search. Free, no API key, but a User-Agent is required.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct NmPlace {
    display_name: String,
    lat: String,
    lon: String,
    #[serde(default)]
    address: Option<NmAddress>,
}

#[derive(Debug, Deserialize)]
struct NmAddress {
    country: Option<String>,
}

impl NmPlace {
    fn into_candidate(self) -> Result<PlaceCandidate, SourceError> {
        let latitude = self.lat.trim().parse::<f64>().map_err(|_| {
            SourceError::malformed(SERVICE, format!("unparseable latitude '{}'", self.lat))
        })?;
        let longitude = self.lon.trim().parse::<f64>().map_err(|_| {
            SourceError::malformed(SERVICE, format!("unparseable longitude '{}'", self.lon))
        })?;

        // "Paris, Île-de-France, France métropolitaine, France" -> "Paris"
        let name = self
            .display_name
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        let country = self.address.and_then(|a| a.country).unwrap_or_default();

        Ok(PlaceCandidate {
            name,
            country,
            latitude,
            longitude,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(
        &self,
        text: &str,
        country: Option<&CountryCode>,
    ) -> Result<Vec<PlaceCandidate>, SourceError> {
        let limit = CANDIDATE_LIMIT.to_string();
        let mut query = vec![
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
            ("limit", limit),
            ("q", text.to_string()),
        ];
        if let Some(cc) = country {
            query.push(("countrycodes", cc.as_str().to_ascii_lowercase()));
        }

        let places: Vec<NmPlace> = get_json(&self.http, SERVICE, &self.base_url, &query).await?;

        collect_candidates(places)
    }
}

/// The first hit must parse since it is the one the resolver uses. Later hits
/// that don't parse are dropped.
fn collect_candidates(places: Vec<NmPlace>) -> Result<Vec<PlaceCandidate>, SourceError> {
    let mut candidates = Vec::with_capacity(places.len());
    for (index, place) in places.into_iter().enumerate() {
        match place.into_candidate() {
            Ok(candidate) => candidates.push(candidate),
            Err(e) if index == 0 => return Err(e),
            Err(e) => tracing::warn!(index, error = %e, "skipping unparseable nominatim result"),
        }
    }
    Ok(candidates)
}
