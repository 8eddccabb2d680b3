use thiserror::Error;

/// Failures of a single weather lookup. None of them are retried.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The provider answered 404 with a readable failure body.
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// No HTTP response could be obtained.
    #[error("Failed to reach the weather service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Weather service responded with status {status}: {}", truncate_body(.body))]
    Http { status: u16, body: String },

    #[error("Failed to parse weather response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("A city name is required to search")]
    EmptyCityName,

    #[error(transparent)]
    Location(#[from] LocationError),
}

impl WeatherError {
    /// HTTP status carried by the error, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            WeatherError::Http { status, .. } => Some(*status),
            WeatherError::CityNotFound(_) => Some(404),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location permission denied; enable it in the system settings")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
