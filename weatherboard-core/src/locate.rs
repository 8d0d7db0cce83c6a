//! Locating the user without asking: device sensor first, IP lookup as fallback.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    error::{LocalLocationError, SourceError},
    http::get_json,
    model::{Coordinates, PlaceSource, ResolvedPlace},
};

pub const DEFAULT_DEVICE_WAIT: Duration = Duration::from_secs(2);
pub const IPAPI_URL: &str = "https://ipapi.co/json/";
const SERVICE: &str = "ipapi";
const UNKNOWN_CITY: &str = "Unknown location";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    Unavailable,
    #[error("Location error: {0}")]
    Other(String),
}

/// One-shot position request against a device sensor.
#[async_trait]
pub trait DeviceLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, DeviceError>;
}

/// Host has no position sensor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDevice;

#[async_trait]
impl DeviceLocator for NoDevice {
    async fn locate(&self) -> Result<Coordinates, DeviceError> {
        Err(DeviceError::Unavailable)
    }
}

/// Position pinned in configuration, reported as if a sensor produced it.
#[derive(Debug, Clone, Copy)]
pub struct FixedDevice(pub Coordinates);

#[async_trait]
impl DeviceLocator for FixedDevice {
    async fn locate(&self) -> Result<Coordinates, DeviceError> {
        Ok(self.0)
    }
}

/// Approximate location derived from the caller's network address.
#[derive(Debug, Clone, PartialEq)]
pub struct IpFix {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<IpFix, SourceError>;
}

#[derive(Debug, Clone)]
pub struct IpApiLocator {
    http: Client,
    base_url: String,
}

impl IpApiLocator {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
}

impl TryFrom<IpApiResponse> for IpFix {
    type Error = SourceError;

    fn try_from(res: IpApiResponse) -> Result<Self, Self::Error> {
        if res.error {
            let reason = res.reason.unwrap_or_else(|| "unspecified error".to_string());
            return Err(SourceError::malformed(SERVICE, reason));
        }

        match (res.latitude, res.longitude) {
            (Some(latitude), Some(longitude)) => Ok(IpFix {
                latitude,
                longitude,
                city: res.city.filter(|c| !c.trim().is_empty()),
                country: res.country_name.filter(|c| !c.trim().is_empty()),
            }),
            _ => Err(SourceError::malformed(SERVICE, "response carried no coordinates")),
        }
    }
}

#[async_trait]
impl IpLocator for IpApiLocator {
    async fn locate(&self) -> Result<IpFix, SourceError> {
        let res: IpApiResponse =
            get_json(&self.http, SERVICE, &self.base_url, &[] as &[(&str, &str)]).await?;
        IpFix::try_from(res)
    }
}

/// Races the device sensor against a timer and falls back to the IP locator.
#[derive(Debug)]
pub struct LocalLocationStrategy {
    device: Box<dyn DeviceLocator>,
    ip: Box<dyn IpLocator>,
    wait: Duration,
}

impl LocalLocationStrategy {
    pub fn new(device: Box<dyn DeviceLocator>, ip: Box<dyn IpLocator>) -> Self {
        Self {
            device,
            ip,
            wait: DEFAULT_DEVICE_WAIT,
        }
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub async fn locate(&self) -> Result<ResolvedPlace, LocalLocationError> {
        // A device answer arriving after the deadline is dropped along with its future.
        match tokio::time::timeout(self.wait, self.device.locate()).await {
            Ok(Ok(coordinates)) => {
                info!(
                    lat = coordinates.latitude(),
                    lon = coordinates.longitude(),
                    "device location acquired"
                );
                return Ok(ResolvedPlace::from_gps(coordinates));
            }
            Ok(Err(error)) => warn!(%error, "device location failed, trying IP lookup"),
            Err(_) => debug!(wait_ms = self.wait.as_millis() as u64, "device location timed out"),
        }

        let fix = self.ip.locate().await.map_err(LocalLocationError::Ip)?;
        let coordinates = Coordinates::new(fix.latitude, fix.longitude)?;

        let place = ResolvedPlace {
            name: fix.city.unwrap_or_else(|| UNKNOWN_CITY.to_string()),
            country: fix.country.unwrap_or_default(),
            coordinates,
            source: PlaceSource::Ip,
        };
        info!(place = %place.display_name(), "located by IP");
        Ok(place)
    }
}
