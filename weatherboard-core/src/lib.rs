//! Core library for the `weatherboard` dashboard.
//!
//! This crate defines:
//! - Place resolution (free-text geocoding, device and IP location)
//! - Forecast retrieval and normalization
//! - Projection of a forecast into current/hourly/daily display views
//! - The rendering adapter trait and the controller that drives it
//! - Configuration and the static region catalogue
//!
//! It is used by `weatherboard-cli`, but any front-end that implements
//! [`Renderer`] can drive a [`DashboardController`].

pub mod catalog;
pub mod classify;
pub mod config;
pub mod controller;
pub mod error;
pub mod forecast;
pub mod geocoder;
pub mod http;
pub mod locate;
pub mod model;
pub mod projector;
pub mod render;
pub mod resolver;

pub use catalog::RegionCatalog;
pub use classify::{IconCategory, WeatherDescriptor, classify};
pub use config::Config;
pub use controller::{DashboardController, Outcome};
pub use error::{ErrorKind, FetchError, LocalLocationError, ResolutionError};
pub use forecast::{ForecastSource, OpenMeteoForecast};
pub use geocoder::{Geocoder, GeocoderId};
pub use locate::LocalLocationStrategy;
pub use model::{CountryCode, ForecastPayload, PlaceQuery, PlaceSource, ResolvedPlace};
pub use projector::{CurrentView, DailyView, DashboardViews, HourlyView};
pub use render::Renderer;
pub use resolver::LocationResolver;
