use std::sync::Arc;

use tracing::debug;

use crate::{
    WeatherError,
    error::LocationError,
    model::{Coordinates, WeatherModel, WeatherQuery},
    provider::WeatherProvider,
};

/// Receiver of lookup results, borrowed only for the duration of a fetch.
pub trait WeatherObserver {
    fn on_weather_updated(&self, model: WeatherModel);

    fn on_error(&self, error: WeatherError);
}

/// Forwards every lookup to a [`WeatherProvider`] and reports the outcome to
/// a [`WeatherObserver`]. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct WeatherController {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherController {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn fetch_weather(&self, city: &str, observer: &dyn WeatherObserver) {
        self.fetch_weather_for(WeatherQuery::city(city), observer).await
    }

    pub async fn fetch_weather_at(&self, coordinates: Coordinates, observer: &dyn WeatherObserver) {
        self.fetch_weather_for(WeatherQuery::Coordinates(coordinates), observer).await
    }

    /// Continue from a location request: look up the fix, or report why
    /// there is none.
    pub async fn fetch_weather_for_fix(
        &self,
        fix: Result<Coordinates, LocationError>,
        observer: &dyn WeatherObserver,
    ) {
        match fix {
            Ok(coordinates) => self.fetch_weather_at(coordinates, observer).await,
            Err(err) => observer.on_error(err.into()),
        }
    }

    /// Run one lookup; the observer is called exactly once.
    pub async fn fetch_weather_for(&self, query: WeatherQuery, observer: &dyn WeatherObserver) {
        match self.lookup(query).await {
            Ok(model) => observer.on_weather_updated(model),
            Err(err) => observer.on_error(err),
        }
    }

    async fn lookup(&self, query: WeatherQuery) -> Result<WeatherModel, WeatherError> {
        if let WeatherQuery::City(name) = &query {
            if name.trim().is_empty() {
                return Err(WeatherError::EmptyCityName);
            }
        }

        debug!(?query, "fetching weather");
        self.provider.current_weather(&query).await
    }
}
