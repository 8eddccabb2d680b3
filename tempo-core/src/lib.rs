//! Core library for the `tempo` weather lookup.
//!
//! This crate defines:
//! - The OpenWeather client and its error taxonomy
//! - One-shot device location with permission handling
//! - A controller that forwards lookups to an observer
//! - Configuration & credentials handling
//!
//! It is used by `tempo-cli`, but any front-end can drive it through the
//! observer traits.

pub mod config;
pub mod controller;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;

pub use config::Config;
pub use controller::{WeatherController, WeatherObserver};
pub use error::{LocationError, WeatherError};
pub use location::{AuthorizationStatus, LocationObserver, LocationProvider, LocationSource};
pub use model::{ConditionCategory, Coordinates, WeatherModel, WeatherQuery};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
