use crate::{
    Config, WeatherError, WeatherModel, WeatherQuery, model::Coordinates,
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// A source of current conditions.
///
/// Implementations complete every call with exactly one result and never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherModel, WeatherError>;

    async fn fetch_by_city(&self, name: &str) -> Result<WeatherModel, WeatherError> {
        self.current_weather(&WeatherQuery::city(name)).await
    }

    async fn fetch_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherModel, WeatherError> {
        self.current_weather(&WeatherQuery::Coordinates(Coordinates::new(latitude, longitude)))
            .await
    }
}

/// Construct the OpenWeather client from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let mut client = OpenWeatherClient::new(api_key);
    if let Some(base_url) = config.base_url.as_deref() {
        client = client.with_base_url(base_url);
    }

    Ok(Box::new(client))
}
