use crate::{Config, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current weather conditions for a named location.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for `city` in metric units.
    ///
    /// Any transport failure, non-success status or unexpected body shape is an error.
    async fn current_weather(&self, city: &str) -> anyhow::Result<WeatherSnapshot>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    config.validate()?;
    let api_key = config.resolve_api_key()?;
    let provider = OpenWeatherProvider::new(api_key, config.base_url.clone(), config.timeout())?;

    Ok(Box::new(provider))
}
