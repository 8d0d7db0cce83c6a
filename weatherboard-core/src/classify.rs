//! WMO weather code classification.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::Serialize;
use std::fmt;

/// Icon families understood by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IconCategory {
    ClearDay,
    PartlyCloudyDay,
    Cloudy,
    Rain,
    Snow,
    Sleet,
}

impl IconCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconCategory::ClearDay => "CLEAR_DAY",
            IconCategory::PartlyCloudyDay => "PARTLY_CLOUDY_DAY",
            IconCategory::Cloudy => "CLOUDY",
            IconCategory::Rain => "RAIN",
            IconCategory::Snow => "SNOW",
            IconCategory::Sleet => "SLEET",
        }
    }
}

impl fmt::Display for IconCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherDescriptor {
    pub label: &'static str,
    pub short_label: &'static str,
    pub icon: IconCategory,
}

const fn descriptor(
    label: &'static str,
    short_label: &'static str,
    icon: IconCategory,
) -> WeatherDescriptor {
    WeatherDescriptor {
        label,
        short_label,
        icon,
    }
}

pub const UNKNOWN: WeatherDescriptor = descriptor("Unknown", "--", IconCategory::Cloudy);

/// Ordered (codes, descriptor) table; the first set containing a code wins.
pub const CODE_TABLE: &[(&[i32], WeatherDescriptor)] = &[
    (&[0], descriptor("Clear sky", "Sunny", IconCategory::ClearDay)),
    (
        &[1, 2],
        descriptor("Mainly clear", "Partly cloudy", IconCategory::PartlyCloudyDay),
    ),
    (&[3], descriptor("Overcast", "Cloudy", IconCategory::Cloudy)),
    (&[45, 48], descriptor("Fog", "Foggy", IconCategory::Cloudy)),
    (
        &[51, 53, 55, 56, 57],
        descriptor("Drizzle", "Drizzle", IconCategory::Rain),
    ),
    (
        &[61, 63, 65, 80, 81, 82],
        descriptor("Rain", "Rain", IconCategory::Rain),
    ),
    (&[71, 73, 75, 77], descriptor("Snow", "Snow", IconCategory::Snow)),
    (
        &[95, 96, 97, 98, 99],
        descriptor("Thunderstorm", "Storm", IconCategory::Sleet),
    ),
];

pub fn classify(code: i32) -> WeatherDescriptor {
    CODE_TABLE
        .iter()
        .find(|(codes, _)| codes.contains(&code))
        .map(|(_, desc)| *desc)
        .unwrap_or(UNKNOWN)
}

/// Missing samples classify as unknown.
pub fn classify_sample(code: Option<i32>) -> WeatherDescriptor {
    code.map(classify).unwrap_or(UNKNOWN)
}
