//! Wires user triggers to resolution, fetching, projection and rendering.
//!
//! Overlapping triggers are not locked out. Each cycle takes a ticket from a
//! counter, and a cycle whose ticket is no longer the newest after an await
//! renders nothing.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, warn};

use crate::{
    Config,
    error::ErrorKind,
    forecast::{ForecastSource, OpenMeteoForecast},
    geocoder::{GeocoderId, geocoder_from_config},
    http::build_client,
    locate::{DeviceLocator, FixedDevice, IpApiLocator, LocalLocationStrategy, NoDevice},
    model::{PlaceQuery, ResolvedPlace},
    projector::project,
    render::Renderer,
    resolver::LocationResolver,
};

/// How a trigger ended. Failures have already been shown by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rendered(ResolvedPlace),
    NotFound,
    Failed(ErrorKind),
    /// A newer trigger started while this one was in flight; nothing was rendered.
    Superseded,
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct DashboardController<R: Renderer> {
    resolver: LocationResolver,
    forecast: Box<dyn ForecastSource>,
    local: LocalLocationStrategy,
    renderer: R,
    clock: Clock,
    generation: AtomicU64,
}

impl<R: Renderer> DashboardController<R> {
    pub fn new(
        resolver: LocationResolver,
        forecast: Box<dyn ForecastSource>,
        local: LocalLocationStrategy,
        renderer: R,
    ) -> Self {
        Self {
            resolver,
            forecast,
            local,
            renderer,
            clock: Box::new(Utc::now),
            generation: AtomicU64::new(0),
        }
    }

    /// Build the production wiring: shared HTTP client, configured geocoder,
    /// Open-Meteo forecasts and the device/IP strategy.
    pub fn from_config(config: &Config, geocoder: Option<GeocoderId>, renderer: R) -> Result<Self> {
        let http = build_client(config.user_agent(), config.request_timeout())
            .context("Failed to build HTTP client")?;

        let geocoder_id = match geocoder {
            Some(id) => id,
            None => config.default_geocoder_id()?,
        };
        debug!(geocoder = %geocoder_id, "wiring dashboard");

        let resolver = LocationResolver::new(geocoder_from_config(geocoder_id, config, http.clone()));
        let forecast = OpenMeteoForecast::new(http.clone(), config.endpoints.forecast.clone());

        let device: Box<dyn DeviceLocator> = match config.device_position {
            Some(position) => Box::new(FixedDevice(position)),
            None => Box::new(NoDevice),
        };
        let ip = IpApiLocator::new(http, config.endpoints.ip_location.clone());
        let local = LocalLocationStrategy::new(device, Box::new(ip))
            .with_wait(config.location_timeout());

        Ok(Self::new(resolver, Box::new(forecast), local, renderer))
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Search for a place by name and show its forecast.
    pub async fn search(&self, query: &PlaceQuery) -> Outcome {
        let ticket = self.begin();
        let outcome = self.search_cycle(ticket, query).await;
        self.finish(ticket);
        outcome
    }

    /// Locate the user (device, then IP) and show the local forecast.
    pub async fn load_local(&self) -> Outcome {
        let ticket = self.begin();
        let outcome = self.local_cycle(ticket).await;
        self.finish(ticket);
        outcome
    }

    async fn search_cycle(&self, ticket: u64, query: &PlaceQuery) -> Outcome {
        let resolved = self.resolver.resolve(query).await;
        if self.is_stale(ticket) {
            return Outcome::Superseded;
        }

        match resolved {
            Ok(Some(place)) => self.forecast_cycle(ticket, place).await,
            Ok(None) => {
                self.renderer.show_not_found(query.text.trim());
                Outcome::NotFound
            }
            Err(e) => {
                warn!(error = %e, query = %query.text, "place resolution failed");
                self.fail(ErrorKind::from(&e))
            }
        }
    }

    async fn local_cycle(&self, ticket: u64) -> Outcome {
        let located = self.local.locate().await;
        if self.is_stale(ticket) {
            return Outcome::Superseded;
        }

        match located {
            Ok(place) => self.forecast_cycle(ticket, place).await,
            Err(e) => {
                error!(error = %e, "local location failed");
                self.fail(ErrorKind::from(&e))
            }
        }
    }

    async fn forecast_cycle(&self, ticket: u64, place: ResolvedPlace) -> Outcome {
        let fetched = self.forecast.fetch(place.coordinates).await;
        if self.is_stale(ticket) {
            return Outcome::Superseded;
        }

        let payload = match fetched {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, place = %place.display_name(), "forecast fetch failed");
                return self.fail(ErrorKind::from(&e));
            }
        };

        // All views are built before the first one is shown.
        let views = project(&payload, (self.clock)());
        self.renderer.show_current(&place, &views.current);
        self.renderer.show_hourly(&views.hourly);
        self.renderer.show_daily(&views.daily);

        Outcome::Rendered(place)
    }

    fn fail(&self, kind: ErrorKind) -> Outcome {
        self.renderer.show_error(kind);
        Outcome::Failed(kind)
    }

    fn begin(&self) -> u64 {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.renderer.set_loading(true);
        ticket
    }

    fn finish(&self, ticket: u64) {
        if !self.is_stale(ticket) {
            self.renderer.set_loading(false);
        }
    }

    fn is_stale(&self, ticket: u64) -> bool {
        let stale = self.generation.load(Ordering::SeqCst) != ticket;
        if stale {
            debug!(ticket, "cycle superseded by a newer request");
        }
        stale
    }
}
