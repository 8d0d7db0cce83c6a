//! Pure projections from a [`ForecastPayload`] into the display views.
//!
//! Nothing here performs I/O or reads the clock; the caller passes "now".

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

use crate::{
    classify::{WeatherDescriptor, classify, classify_sample},
    model::ForecastPayload,
};

/// The hourly strip and chart never show more than this many samples.
pub const HOURLY_LIMIT: usize = 24;

const MISSING: &str = "--";

/// Auxiliary detail shown next to the current conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailChip {
    pub label: &'static str,
    pub value: String,
}

impl fmt::Display for DetailChip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub temperature: String,
    pub descriptor: WeatherDescriptor,
    pub wind: String,
    pub observed_at: String,
    pub timezone: String,
    pub chips: Vec<DetailChip>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyEntry {
    pub at: DateTime<FixedOffset>,
    pub time_label: String,
    pub temperature_c: Option<f64>,
    pub temperature: String,
    pub descriptor: WeatherDescriptor,
    pub wind: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HourlyView {
    pub entries: Vec<HourlyEntry>,
}

/// Line-chart series; always the same samples as the strip, in the same order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub temperatures: Vec<Option<f64>>,
}

impl HourlyView {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn chart(&self) -> ChartSeries {
        ChartSeries {
            labels: self.entries.iter().map(|e| e.time_label.clone()).collect(),
            temperatures: self.entries.iter().map(|e| e.temperature_c).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEntry {
    pub date: NaiveDate,
    pub day_label: String,
    pub max_c: Option<f64>,
    pub min_c: Option<f64>,
    pub range: String,
    pub condition: &'static str,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DailyView {
    pub entries: Vec<DailyEntry>,
}

/// Everything one render needs, built before anything is shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub current: CurrentView,
    pub hourly: HourlyView,
    pub daily: DailyView,
}

pub fn project(payload: &ForecastPayload, now: DateTime<Utc>) -> DashboardViews {
    DashboardViews {
        current: current_view(payload),
        hourly: hourly_view(payload, now),
        daily: daily_view(payload),
    }
}

pub fn current_view(payload: &ForecastPayload) -> CurrentView {
    let current = &payload.current;
    let wind = format_wind(Some(current.wind_kmh));

    let mut chips = vec![DetailChip {
        label: "Wind",
        value: wind.clone(),
    }];

    if let Some(humidity) = first_sample(payload.hourly.humidity_pct.as_deref()) {
        chips.push(DetailChip {
            label: "Humidity",
            value: format!("{}%", humidity.round() as i64),
        });
    }
    if let Some(uv) = first_sample(payload.daily.uv_index_max.as_deref()) {
        chips.push(DetailChip {
            label: "UV max",
            value: format!("{uv:.1}"),
        });
    }
    if let Some(sunrise) = first_sample(payload.daily.sunrise.as_deref()) {
        chips.push(DetailChip {
            label: "Sunrise",
            value: sunrise.format("%H:%M").to_string(),
        });
    }
    if let Some(sunset) = first_sample(payload.daily.sunset.as_deref()) {
        chips.push(DetailChip {
            label: "Sunset",
            value: sunset.format("%H:%M").to_string(),
        });
    }

    CurrentView {
        temperature: format_celsius(Some(current.temperature_c)),
        descriptor: classify(current.weather_code),
        wind,
        observed_at: current.observed_at.format("%H:%M").to_string(),
        timezone: payload.timezone.clone(),
        chips,
    }
}

/// The first [`HOURLY_LIMIT`] samples at or after `now`, in series order.
pub fn hourly_view(payload: &ForecastPayload, now: DateTime<Utc>) -> HourlyView {
    let hourly = &payload.hourly;

    let entries = hourly
        .time
        .iter()
        .enumerate()
        .filter(|(_, at)| at.with_timezone(&Utc) >= now)
        .take(HOURLY_LIMIT)
        .map(|(i, at)| {
            let temperature_c = sample(&hourly.temperature_c, i);
            HourlyEntry {
                at: *at,
                time_label: at.format("%H:%M").to_string(),
                temperature_c,
                temperature: format_celsius(temperature_c),
                descriptor: classify_sample(sample(&hourly.weather_code, i)),
                wind: format_wind(sample(&hourly.wind_kmh, i)),
            }
        })
        .collect();

    HourlyView { entries }
}

/// Every daily sample, unfiltered.
pub fn daily_view(payload: &ForecastPayload) -> DailyView {
    let daily = &payload.daily;

    let entries = daily
        .date
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let max_c = sample(&daily.temperature_max_c, i);
            let min_c = sample(&daily.temperature_min_c, i);
            DailyEntry {
                date: *date,
                day_label: date.format("%a %-d").to_string(),
                max_c,
                min_c,
                range: format!("{} / {}", format_degrees(max_c), format_degrees(min_c)),
                condition: classify_sample(sample(&daily.weather_code, i)).short_label,
            }
        })
        .collect();

    DailyView { entries }
}

fn sample<T: Copy>(channel: &[Option<T>], i: usize) -> Option<T> {
    channel.get(i).copied().flatten()
}

fn first_sample<T: Copy>(channel: Option<&[Option<T>]>) -> Option<T> {
    channel.and_then(|c| sample(c, 0))
}

pub fn format_celsius(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}°C", round_whole(v)),
        None => MISSING.to_string(),
    }
}

fn format_degrees(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}°", round_whole(v)),
        None => MISSING.to_string(),
    }
}

pub fn format_wind(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v} km/h"),
        None => MISSING.to_string(),
    }
}

/// Half away from zero, and never "-0".
fn round_whole(value: f64) -> i64 {
    value.round() as i64
}
