//! End-to-end dashboard cycles against mocked services.

use chrono::{TimeZone, Utc};
use std::sync::Mutex;
use weatherboard_core::{
    Config, CurrentView, DailyView, DashboardController, ErrorKind, GeocoderId, HourlyView,
    Outcome, PlaceQuery, Renderer, ResolvedPlace, config::Endpoints,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Screen {
    current: Mutex<Option<(String, CurrentView)>>,
    hourly: Mutex<Option<HourlyView>>,
    daily: Mutex<Option<DailyView>>,
    not_found: Mutex<Vec<String>>,
    errors: Mutex<Vec<ErrorKind>>,
}

impl Renderer for Screen {
    fn show_current(&self, place: &ResolvedPlace, view: &CurrentView) {
        *self.current.lock().unwrap() = Some((place.display_name(), view.clone()));
    }

    fn show_hourly(&self, view: &HourlyView) {
        *self.hourly.lock().unwrap() = Some(view.clone());
    }

    fn show_daily(&self, view: &DailyView) {
        *self.daily.lock().unwrap() = Some(view.clone());
    }

    fn show_not_found(&self, query: &str) {
        self.not_found.lock().unwrap().push(query.to_string());
    }

    fn show_error(&self, kind: ErrorKind) {
        self.errors.lock().unwrap().push(kind);
    }
}

fn config_for(server: &MockServer) -> Config {
    Config {
        endpoints: Endpoints {
            forecast: format!("{}/v1/forecast", server.uri()),
            nominatim: format!("{}/search", server.uri()),
            open_meteo_geocoding: format!("{}/v1/search", server.uri()),
            ip_location: format!("{}/json/", server.uri()),
        },
        ..Config::default()
    }
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "timezone": "Europe/Paris",
        "utc_offset_seconds": 7200,
        "current_weather": {
            "temperature": 18,
            "windspeed": 10,
            "weathercode": 1,
            "time": "2026-10-19T14:00"
        },
        "hourly": {
            "time": [
                "2026-10-19T13:00", "2026-10-19T14:00", "2026-10-19T15:00", "2026-10-19T16:00"
            ],
            "temperature_2m": [17.2, 18.0, 17.5, 16.1],
            "weathercode": [1, 1, 3, 61],
            "windspeed_10m": [9.0, 10.0, 11.5, 13.0]
        },
        "daily": {
            "time": ["2026-10-19", "2026-10-20", "2026-10-21"],
            "weathercode": [1, 61, 97],
            "temperature_2m_max": [19.0, 15.0, 14.0],
            "temperature_2m_min": [10.0, 8.0, 7.0]
        }
    })
}

/// 12:00Z is 14:00 in the payload's +02:00 offset.
fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn test_paris_search_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "display_name": "Paris, Île-de-France, France",
                "lat": "48.85",
                "lon": "2.35",
                "address": { "country": "France" }
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "48.85"))
        .and(query_param("longitude", "2.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard =
        DashboardController::from_config(&config_for(&server), None, Screen::default())
            .unwrap()
            .with_clock(fixed_now);

    let outcome = dashboard.search(&PlaceQuery::new("Paris")).await;
    assert!(matches!(outcome, Outcome::Rendered(_)));

    let screen = dashboard.renderer();
    let (place, current) = screen.current.lock().unwrap().clone().unwrap();
    assert_eq!(place, "Paris, France");
    assert_eq!(current.descriptor.label, "Mainly clear");
    assert_eq!(current.temperature, "18°C");
    assert_eq!(current.wind, "10 km/h");

    // The 13:00 sample is in the past; 14:00 equals now and is kept.
    let hourly = screen.hourly.lock().unwrap().clone().unwrap();
    let labels: Vec<_> = hourly.entries.iter().map(|e| e.time_label.as_str()).collect();
    assert_eq!(labels, vec!["14:00", "15:00", "16:00"]);
    assert_eq!(hourly.chart().labels, labels);

    let daily = screen.daily.lock().unwrap().clone().unwrap();
    assert_eq!(daily.entries.len(), 3);
    assert_eq!(daily.entries[2].condition, "Storm");

    assert!(screen.errors.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_geocode_result_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = DashboardController::from_config(
        &config_for(&server),
        Some(GeocoderId::OpenMeteo),
        Screen::default(),
    )
    .unwrap();

    let outcome = dashboard.search(&PlaceQuery::new("Xyzzyville")).await;

    assert_eq!(outcome, Outcome::NotFound);
    let screen = dashboard.renderer();
    assert_eq!(*screen.not_found.lock().unwrap(), vec!["Xyzzyville".to_string()]);
    assert!(screen.current.lock().unwrap().is_none());
    assert!(screen.hourly.lock().unwrap().is_none());
    assert!(screen.daily.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_forecast_outage_keeps_screen_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "display_name": "Rome, Lazio, Italy", "lat": "41.89", "lon": "12.48",
              "address": { "country": "Italy" } }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dashboard =
        DashboardController::from_config(&config_for(&server), None, Screen::default()).unwrap();

    let outcome = dashboard.search(&PlaceQuery::new("Rome")).await;

    assert_eq!(outcome, Outcome::Failed(ErrorKind::Fetch));
    let screen = dashboard.renderer();
    assert_eq!(*screen.errors.lock().unwrap(), vec![ErrorKind::Fetch]);
    assert!(screen.current.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_local_load_without_device_uses_ip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Lyon",
            "country_name": "France",
            "latitude": 45.75,
            "longitude": 4.85
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "45.75"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let dashboard = DashboardController::from_config(&config_for(&server), None, Screen::default())
        .unwrap()
        .with_clock(fixed_now);

    let outcome = dashboard.load_local().await;

    let Outcome::Rendered(place) = outcome else {
        panic!("expected rendered outcome, got {outcome:?}");
    };
    assert_eq!(place.source.as_str(), "ip");
    assert_eq!(place.display_name(), "Lyon, France");
}

#[tokio::test]
async fn test_local_load_with_pinned_device_skips_ip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.device_position = Some(weatherboard_core::model::Coordinates::new(35.68, 139.69).unwrap());

    let dashboard = DashboardController::from_config(&config, None, Screen::default())
        .unwrap()
        .with_clock(fixed_now);

    let outcome = dashboard.load_local().await;

    let Outcome::Rendered(place) = outcome else {
        panic!("expected rendered outcome, got {outcome:?}");
    };
    assert_eq!(place.source.as_str(), "gps");
    assert!(place.display_name().starts_with("Current location"));
}

#[tokio::test]
async fn test_local_load_fails_when_ip_lookup_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dashboard =
        DashboardController::from_config(&config_for(&server), None, Screen::default()).unwrap();

    let outcome = dashboard.load_local().await;

    assert_eq!(outcome, Outcome::Failed(ErrorKind::LocalLocation));
    assert_eq!(*dashboard.renderer().errors.lock().unwrap(), vec![ErrorKind::LocalLocation]);
    assert!(dashboard.renderer().current.lock().unwrap().is_none());
}
