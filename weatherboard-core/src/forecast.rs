//! Forecast retrieval from Open-Meteo.
//!
//! One request per call returns current, hourly and daily data together. The
//! wire payload is validated and converted into a [`ForecastPayload`] before it
//! leaves this module, so a misaligned or partially missing series never reaches
//! the projector.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    error::{FetchError, SourceError},
    http::get_json,
    model::{
        Coordinates, CurrentConditions, DailySeries, ForecastPayload, HourlySeries,
    },
};

pub const OPEN_METEO_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const SERVICE: &str = "open-meteo forecast";

const HOURLY_CHANNELS: &str = "temperature_2m,weathercode,windspeed_10m,relativehumidity_2m";
const DAILY_CHANNELS: &str =
    "weathercode,temperature_2m_max,temperature_2m_min,sunrise,sunset,uv_index_max";

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[async_trait]
pub trait ForecastSource: Send + Sync + Debug {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastPayload, FetchError>;
}

#[derive(Debug, Clone)]
pub struct OpenMeteoForecast {
    http: Client,
    base_url: String,
}

impl OpenMeteoForecast {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ForecastSource for OpenMeteoForecast {
    async fn fetch(&self, coordinates: Coordinates) -> Result<ForecastPayload, FetchError> {
        let query = [
            ("latitude", coordinates.latitude().to_string()),
            ("longitude", coordinates.longitude().to_string()),
            ("timezone", "auto".to_string()),
            ("current_weather", "true".to_string()),
            ("hourly", HOURLY_CHANNELS.to_string()),
            ("daily", DAILY_CHANNELS.to_string()),
        ];

        let wire: OmForecastResponse =
            get_json(&self.http, SERVICE, &self.base_url, &query).await?;

        let payload = wire.into_payload()?;
        tracing::info!(
            timezone = %payload.timezone,
            hourly = payload.hourly.len(),
            daily = payload.daily.len(),
            "forecast fetched"
        );
        Ok(payload)
    }
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    current_weather: OmCurrentWeather,
    hourly: OmHourly,
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: i32,
    time: String,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    weathercode: Vec<Option<i32>>,
    windspeed_10m: Vec<Option<f64>>,
    #[serde(default)]
    relativehumidity_2m: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<String>,
    weathercode: Vec<Option<i32>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    sunrise: Option<Vec<Option<String>>>,
    #[serde(default)]
    sunset: Option<Vec<Option<String>>>,
    #[serde(default)]
    uv_index_max: Option<Vec<Option<f64>>>,
}

impl OmForecastResponse {
    fn into_payload(self) -> Result<ForecastPayload, SourceError> {
        let offset = FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            SourceError::malformed(
                SERVICE,
                format!("utc_offset_seconds {} out of range", self.utc_offset_seconds),
            )
        })?;
        let zone = LocalZone::new(self.timezone.as_deref(), offset);

        let current = CurrentConditions {
            temperature_c: self.current_weather.temperature,
            wind_kmh: self.current_weather.windspeed,
            weather_code: self.current_weather.weathercode,
            observed_at: zone.parse(&self.current_weather.time)?,
        };

        let hourly = HourlySeries {
            time: self
                .hourly
                .time
                .iter()
                .map(|t| zone.parse(t))
                .collect::<Result<_, _>>()?,
            temperature_c: self.hourly.temperature_2m,
            weather_code: self.hourly.weathercode,
            wind_kmh: self.hourly.windspeed_10m,
            humidity_pct: self.hourly.relativehumidity_2m,
        };
        if let Some(channel) = hourly.misaligned_channel() {
            return Err(SourceError::malformed(
                SERVICE,
                format!("hourly channel '{channel}' is not aligned with time"),
            ));
        }

        let daily = DailySeries {
            date: self
                .daily
                .time
                .iter()
                .map(|d| parse_date(d.as_str()))
                .collect::<Result<_, _>>()?,
            weather_code: self.daily.weathercode,
            temperature_max_c: self.daily.temperature_2m_max,
            temperature_min_c: self.daily.temperature_2m_min,
            sunrise: parse_optional_times(self.daily.sunrise, &zone)?,
            sunset: parse_optional_times(self.daily.sunset, &zone)?,
            uv_index_max: self.daily.uv_index_max,
        };
        if let Some(channel) = daily.misaligned_channel() {
            return Err(SourceError::malformed(
                SERVICE,
                format!("daily channel '{channel}' is not aligned with time"),
            ));
        }

        Ok(ForecastPayload {
            timezone: self.timezone.unwrap_or_else(|| "GMT".to_string()),
            utc_offset: offset,
            current,
            hourly,
            daily,
        })
    }
}

/// Wall-clock zone of the forecast location.
///
/// Open-Meteo reports local times, and `utc_offset_seconds` only holds for
/// "now". Samples past a DST change need the named zone's own offset, so the
/// fixed offset is used only when the zone name is unknown or a local time
/// falls into a spring-forward gap.
struct LocalZone {
    named: Option<Tz>,
    fallback: FixedOffset,
}

impl LocalZone {
    fn new(timezone: Option<&str>, fallback: FixedOffset) -> Self {
        let named = timezone.and_then(|name| match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                tracing::warn!(timezone = name, "unknown timezone, using fixed utc offset");
                None
            }
        });
        Self { named, fallback }
    }

    fn anchor(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        self.named
            .and_then(|tz| tz.from_local_datetime(&naive).earliest())
            .map(|dt| dt.fixed_offset())
            .or_else(|| naive.and_local_timezone(self.fallback).single())
    }

    fn parse(&self, value: &str) -> Result<DateTime<FixedOffset>, SourceError> {
        NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT)
            .ok()
            .and_then(|naive| self.anchor(naive))
            .ok_or_else(|| SourceError::malformed(SERVICE, format!("bad timestamp '{value}'")))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, SourceError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| SourceError::malformed(SERVICE, format!("bad date '{value}'")))
}

fn parse_optional_times(
    values: Option<Vec<Option<String>>>,
    zone: &LocalZone,
) -> Result<Option<Vec<Option<DateTime<FixedOffset>>>>, SourceError> {
    values
        .map(|samples| {
            samples
                .into_iter()
                .map(|s| s.map(|s| zone.parse(&s)).transpose())
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "timezone": "Europe/Paris",
            "utc_offset_seconds": 7200,
            "current_weather": {
                "temperature": 18.0,
                "windspeed": 10.0,
                "weathercode": 1,
                "time": "2026-10-19T12:00"
            },
            "hourly": {
                "time": ["2026-10-19T12:00", "2026-10-19T13:00"],
                "temperature_2m": [18.0, null],
                "weathercode": [1, 3],
                "windspeed_10m": [10.0, 12.5],
                "relativehumidity_2m": [65.0, 70.0]
            },
            "daily": {
                "time": ["2026-10-19"],
                "weathercode": [1],
                "temperature_2m_max": [21.0],
                "temperature_2m_min": [12.0],
                "sunrise": ["2026-10-19T08:12"],
                "sunset": ["2026-10-19T18:55"]
            }
        })
    }

    fn parse(value: serde_json::Value) -> Result<ForecastPayload, SourceError> {
        let wire: OmForecastResponse = serde_json::from_value(value).expect("wire shape");
        wire.into_payload()
    }

    #[test]
    fn local_times_are_anchored_at_payload_offset() {
        let payload = parse(sample()).expect("valid payload");

        let expected = Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap();
        assert_eq!(payload.current.observed_at, expected);
        assert_eq!(payload.hourly.time[1], expected + chrono::Duration::hours(1));
        assert_eq!(payload.timezone, "Europe/Paris");
    }

    #[test]
    fn null_samples_and_missing_channels_are_preserved() {
        let payload = parse(sample()).expect("valid payload");

        assert_eq!(payload.hourly.temperature_c, vec![Some(18.0), None]);
        assert!(payload.daily.uv_index_max.is_none());
        assert_eq!(payload.daily.sunrise.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn misaligned_hourly_channel_is_rejected() {
        let mut value = sample();
        value["hourly"]["windspeed_10m"] = serde_json::json!([10.0]);

        let err = parse(value).unwrap_err();
        assert!(err.to_string().contains("windspeed_10m"));
    }

    #[test]
    fn misaligned_optional_daily_channel_is_rejected() {
        let mut value = sample();
        value["daily"]["uv_index_max"] = serde_json::json!([3.0, 4.0]);

        let err = parse(value).unwrap_err();
        assert!(err.to_string().contains("uv_index_max"));
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let mut value = sample();
        value["hourly"]["time"] = serde_json::json!(["yesterday", "2026-10-19T13:00"]);

        let err = parse(value).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn samples_after_dst_change_use_the_zone_offset() {
        let mut value = sample();
        // Paris leaves summer time on 2026-10-25.
        value["hourly"]["time"] = serde_json::json!(["2026-10-24T12:00", "2026-10-26T12:00"]);
        value["daily"]["sunrise"] = serde_json::json!(["2026-10-26T07:25"]);

        let payload = parse(value).expect("valid payload");

        assert_eq!(
            payload.hourly.time[0],
            Utc.with_ymd_and_hms(2026, 10, 24, 10, 0, 0).unwrap()
        );
        assert_eq!(
            payload.hourly.time[1],
            Utc.with_ymd_and_hms(2026, 10, 26, 11, 0, 0).unwrap()
        );
        assert_eq!(payload.hourly.time[1].offset().local_minus_utc(), 3600);
        assert_eq!(
            payload.daily.sunrise.as_ref().and_then(|s| s[0]),
            Some(Utc.with_ymd_and_hms(2026, 10, 26, 6, 25, 0).unwrap().fixed_offset())
        );
    }

    #[test]
    fn unknown_timezone_falls_back_to_payload_offset() {
        let mut value = sample();
        value["timezone"] = serde_json::json!("Mars/Olympus_Mons");
        value["hourly"]["time"] = serde_json::json!(["2026-10-24T12:00", "2026-10-26T12:00"]);

        let payload = parse(value).expect("valid payload");

        assert_eq!(
            payload.hourly.time[1],
            Utc.with_ymd_and_hms(2026, 10, 26, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_offset_defaults_to_utc() {
        let mut value = sample();
        value.as_object_mut().expect("object").remove("utc_offset_seconds");
        value.as_object_mut().expect("object").remove("timezone");

        let payload = parse(value).expect("valid payload");
        assert_eq!(payload.utc_offset.local_minus_utc(), 0);
        assert_eq!(payload.timezone, "GMT");
    }
}
