use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    WeatherError,
    model::{WeatherModel, WeatherQuery, round_temperature},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const UNITS: &str = "metric";
const LANGUAGE: &str = "pt_br";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full request URL for `query`. City names are percent-encoded,
    /// coordinates go in as plain decimals.
    pub fn request_url(&self, query: &WeatherQuery) -> String {
        let location = match query {
            WeatherQuery::City(name) => format!("q={}", urlencoding::encode(name)),
            WeatherQuery::Coordinates(c) => format!("lat={}&lon={}", c.latitude, c.longitude),
        };

        format!(
            "{}?{}&appid={}&units={UNITS}&lang={LANGUAGE}",
            self.base_url,
            location,
            urlencoding::encode(&self.api_key),
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current_weather(&self, query: &WeatherQuery) -> Result<WeatherModel, WeatherError> {
        let url = self.request_url(query);
        debug!(?query, base_url = %self.base_url, "requesting current weather");

        let res = self.http.get(&url).send().await?;

        let status = res.status();
        let body = res.text().await?;

        interpret_response(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

impl From<OwCurrentResponse> for WeatherModel {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (condition_id, condition_description) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.id, w.description))
            .unwrap_or_default();

        WeatherModel {
            city_name: parsed.name,
            temperature_celsius: round_temperature(parsed.main.temp),
            condition_id,
            condition_description,
        }
    }
}

/// Body OpenWeather sends alongside a 404.
#[derive(Debug, Deserialize)]
struct OwFailureResponse {
    message: String,
}

/// Classify a provider answer into a model or an error.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<WeatherModel, WeatherError> {
    if status == StatusCode::NOT_FOUND {
        warn!(%status, "weather lookup returned not found");
        return match serde_json::from_str::<OwFailureResponse>(body) {
            Ok(failure) => Err(WeatherError::CityNotFound(failure.message)),
            Err(_) => Err(WeatherError::Http { status: status.as_u16(), body: body.to_string() }),
        };
    }

    if !status.is_success() {
        warn!(%status, "weather lookup failed");
        return Err(WeatherError::Http { status: status.as_u16(), body: body.to_string() });
    }

    let parsed: OwCurrentResponse = serde_json::from_str(body)?;
    Ok(parsed.into())
}
