//! Resolves a free-text place query into one [`ResolvedPlace`].

use tracing::{debug, info};

use crate::{
    error::ResolutionError,
    geocoder::Geocoder,
    model::{Coordinates, PlaceQuery, PlaceSource, ResolvedPlace},
};

/// Queries shorter than this (after trimming, in characters) are never sent out.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug)]
pub struct LocationResolver {
    geocoder: Box<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Box<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// `Ok(None)` means nothing matched; errors are transport or data failures.
    ///
    /// The first candidate wins. There is no ranking and no retry.
    pub async fn resolve(
        &self,
        query: &PlaceQuery,
    ) -> Result<Option<ResolvedPlace>, ResolutionError> {
        let text = query.text.trim();
        if text.chars().count() < MIN_QUERY_CHARS {
            debug!(query = text, "query too short, not searching");
            return Ok(None);
        }

        let candidates = self.geocoder.search(text, query.country.as_ref()).await?;
        debug!(query = text, count = candidates.len(), "geocoder answered");

        let Some(first) = candidates.into_iter().next() else {
            info!(query = text, country = ?query.country, "no place found");
            return Ok(None);
        };

        if first.name.trim().is_empty() {
            return Err(ResolutionError::InvalidCandidate {
                name: first.name,
                reason: "empty name".to_string(),
            });
        }

        let coordinates = Coordinates::new(first.latitude, first.longitude).map_err(|e| {
            ResolutionError::InvalidCandidate {
                name: first.name.clone(),
                reason: e.to_string(),
            }
        })?;

        let place = ResolvedPlace {
            name: first.name,
            country: first.country,
            coordinates,
            source: PlaceSource::Geocode,
        };
        info!(
            place = %place.display_name(),
            lat = place.latitude(),
            lon = place.longitude(),
            "place resolved"
        );
        Ok(Some(place))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        error::SourceError,
        model::{CountryCode, PlaceCandidate},
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Geocoder double that records calls and answers from a fixed list.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct StubGeocoder {
        pub candidates: Vec<PlaceCandidate>,
        pub fail: bool,
        pub calls: Arc<Mutex<Vec<(String, Option<String>)>>>,
    }

    impl StubGeocoder {
        pub(crate) fn with(candidates: Vec<PlaceCandidate>) -> Self {
            Self {
                candidates,
                ..Self::default()
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn search(
            &self,
            text: &str,
            country: Option<&CountryCode>,
        ) -> Result<Vec<PlaceCandidate>, SourceError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), country.map(|c| c.to_string())));
            if self.fail {
                return Err(SourceError::Status {
                    service: "stub",
                    status: 503,
                    body: "down".into(),
                });
            }
            Ok(self.candidates.clone())
        }
    }

    pub(crate) fn candidate(name: &str, country: &str, lat: f64, lon: f64) -> PlaceCandidate {
        PlaceCandidate {
            name: name.into(),
            country: country.into(),
            latitude: lat,
            longitude: lon,
        }
    }

    #[tokio::test]
    async fn short_queries_never_reach_the_geocoder() {
        let geocoder = StubGeocoder::with(vec![candidate("Paris", "France", 48.85, 2.35)]);
        let resolver = LocationResolver::new(Box::new(geocoder.clone()));

        for text in ["", " ", "P", "  é  "] {
            let result = resolver.resolve(&PlaceQuery::new(text)).await.expect("no error");
            assert!(result.is_none(), "'{text}' should be not found");
        }
        assert_eq!(geocoder.call_count(), 0);
    }

    #[tokio::test]
    async fn first_candidate_wins() {
        let geocoder = StubGeocoder::with(vec![
            candidate("Paris", "France", 48.85, 2.35),
            candidate("Paris", "United States", 33.66, -95.55),
        ]);
        let resolver = LocationResolver::new(Box::new(geocoder));

        let place = resolver
            .resolve(&PlaceQuery::new("Paris"))
            .await
            .expect("no error")
            .expect("found");

        assert_eq!(place.display_name(), "Paris, France");
        assert_eq!(place.source, PlaceSource::Geocode);
    }

    #[tokio::test]
    async fn trimmed_text_and_country_are_forwarded() {
        let geocoder = StubGeocoder::with(vec![candidate("Osaka", "Japan", 34.69, 135.50)]);
        let resolver = LocationResolver::new(Box::new(geocoder.clone()));

        let query = PlaceQuery::new("  Osaka ").in_country(CountryCode::try_from("jp").unwrap());
        resolver.resolve(&query).await.expect("no error");

        let calls = geocoder.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("Osaka".to_string(), Some("JP".to_string()))]);
    }

    #[tokio::test]
    async fn no_candidates_is_not_found() {
        let resolver = LocationResolver::new(Box::new(StubGeocoder::default()));

        let result = resolver.resolve(&PlaceQuery::new("Xyzzyville")).await.expect("no error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn transport_failure_is_distinct_from_not_found() {
        let resolver = LocationResolver::new(Box::new(StubGeocoder::failing()));

        let err = resolver.resolve(&PlaceQuery::new("Paris")).await.unwrap_err();
        assert!(matches!(err, ResolutionError::Source(_)));
    }

    #[tokio::test]
    async fn out_of_range_first_candidate_is_an_error() {
        let geocoder = StubGeocoder::with(vec![
            candidate("Broken", "Nowhere", 123.0, 2.35),
            candidate("Paris", "France", 48.85, 2.35),
        ]);
        let resolver = LocationResolver::new(Box::new(geocoder));

        let err = resolver.resolve(&PlaceQuery::new("Broken")).await.unwrap_err();
        assert!(matches!(err, ResolutionError::InvalidCandidate { .. }));
    }
}
