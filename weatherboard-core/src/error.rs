use thiserror::Error;

/// Failure talking to one of the external HTTP collaborators.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {service} failed: {error}")]
    Transport {
        service: &'static str,
        #[source]
        error: reqwest::Error,
    },

    #[error("{service} responded with status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {service} response: {error}")]
    Decode {
        service: &'static str,
        #[source]
        error: serde_json::Error,
    },

    #[error("{service} returned malformed data: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },
}

impl SourceError {
    pub fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            reason: reason.into(),
        }
    }
}

/// The geocoding collaborator could not answer, or answered with an unusable place.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("could not resolve place: {0}")]
    Source(#[from] SourceError),

    #[error("geocoder returned an invalid place '{name}': {reason}")]
    InvalidCandidate { name: String, reason: String },
}

#[derive(Debug, Error)]
#[error("could not fetch forecast: {0}")]
pub struct FetchError(#[from] pub SourceError);

/// Neither the device sensor nor the IP lookup produced a location.
#[derive(Debug, Error)]
pub enum LocalLocationError {
    #[error("could not determine location: {0}")]
    Ip(#[source] SourceError),

    #[error("could not determine location: {0}")]
    InvalidFix(#[from] InvalidCoordinates),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid country code '{0}': expected two ASCII letters, e.g. FR")]
pub struct InvalidCountryCode(pub String);

/// What the rendering side is told about a failed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Resolution,
    Fetch,
    LocalLocation,
}

impl ErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "No results found. Check the place name and try again.",
            ErrorKind::Resolution => {
                "The place search service is unreachable right now. Please try again."
            }
            ErrorKind::Fetch => "Could not load the forecast. Please try again.",
            ErrorKind::LocalLocation => "Could not determine your location.",
        }
    }
}

impl From<&ResolutionError> for ErrorKind {
    fn from(_: &ResolutionError) -> Self {
        ErrorKind::Resolution
    }
}

impl From<&FetchError> for ErrorKind {
    fn from(_: &FetchError) -> Self {
        ErrorKind::Fetch
    }
}

impl From<&LocalLocationError> for ErrorKind {
    fn from(_: &LocalLocationError) -> Self {
        ErrorKind::LocalLocation
    }
}

/// Shorten a response body for inclusion in an error message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
