use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{InvalidCoordinates, InvalidCountryCode};

/// ISO 3166-1 alpha-2 country code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for CountryCode {
    type Error = InvalidCountryCode;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidCountryCode(value.to_string()))
        }
    }
}

impl TryFrom<String> for CountryCode {
    type Error = InvalidCountryCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A free-text place search, optionally scoped to one country.
#[derive(Debug, Clone)]
pub struct PlaceQuery {
    pub text: String,
    pub country: Option<CountryCode>,
}

impl PlaceQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            country: None,
        }
    }

    pub fn in_country(mut self, country: CountryCode) -> Self {
        self.country = Some(country);
        self
    }
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = InvalidCoordinates;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinates> {
        if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceSource {
    Geocode,
    Gps,
    Ip,
}

impl PlaceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceSource::Geocode => "geocode",
            PlaceSource::Gps => "gps",
            PlaceSource::Ip => "ip",
        }
    }
}

impl fmt::Display for PlaceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single place a query or device lookup settled on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPlace {
    pub name: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub source: PlaceSource,
}

impl ResolvedPlace {
    /// A device fix carries no name; only coordinates are known.
    pub fn from_gps(coordinates: Coordinates) -> Self {
        Self {
            name: String::new(),
            country: String::new(),
            coordinates,
            source: PlaceSource::Gps,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.latitude()
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.longitude()
    }

    pub fn display_name(&self) -> String {
        if self.source == PlaceSource::Gps && self.name.is_empty() {
            return format!(
                "Current location ({:.4}, {:.4})",
                self.latitude(),
                self.longitude()
            );
        }

        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }
}

/// One hit from a geocoding service, in the service's own order.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCandidate {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub wind_kmh: f64,
    pub weather_code: i32,
    pub observed_at: DateTime<FixedOffset>,
}

/// Hourly channels, aligned index-for-index with `time`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HourlySeries {
    pub time: Vec<DateTime<FixedOffset>>,
    pub temperature_c: Vec<Option<f64>>,
    pub weather_code: Vec<Option<i32>>,
    pub wind_kmh: Vec<Option<f64>>,
    pub humidity_pct: Option<Vec<Option<f64>>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Returns the name of the first channel whose length differs from `time`.
    pub fn misaligned_channel(&self) -> Option<&'static str> {
        let n = self.time.len();
        if self.temperature_c.len() != n {
            return Some("temperature_2m");
        }
        if self.weather_code.len() != n {
            return Some("weathercode");
        }
        if self.wind_kmh.len() != n {
            return Some("windspeed_10m");
        }
        match &self.humidity_pct {
            Some(h) if h.len() != n => Some("relativehumidity_2m"),
            _ => None,
        }
    }
}

/// Daily channels, aligned index-for-index with `date`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySeries {
    pub date: Vec<NaiveDate>,
    pub weather_code: Vec<Option<i32>>,
    pub temperature_max_c: Vec<Option<f64>>,
    pub temperature_min_c: Vec<Option<f64>>,
    pub sunrise: Option<Vec<Option<DateTime<FixedOffset>>>>,
    pub sunset: Option<Vec<Option<DateTime<FixedOffset>>>>,
    pub uv_index_max: Option<Vec<Option<f64>>>,
}

impl DailySeries {
    pub fn len(&self) -> usize {
        self.date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
    }

    pub fn misaligned_channel(&self) -> Option<&'static str> {
        let n = self.date.len();
        if self.weather_code.len() != n {
            return Some("weathercode");
        }
        if self.temperature_max_c.len() != n {
            return Some("temperature_2m_max");
        }
        if self.temperature_min_c.len() != n {
            return Some("temperature_2m_min");
        }
        if self.sunrise.as_ref().is_some_and(|s| s.len() != n) {
            return Some("sunrise");
        }
        if self.sunset.as_ref().is_some_and(|s| s.len() != n) {
            return Some("sunset");
        }
        if self.uv_index_max.as_ref().is_some_and(|s| s.len() != n) {
            return Some("uv_index_max");
        }
        None
    }
}

/// Current, hourly and daily weather for one coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPayload {
    pub timezone: String,
    pub utc_offset: FixedOffset,
    pub current: CurrentConditions,
    pub hourly: HourlySeries,
    pub daily: DailySeries,
}
