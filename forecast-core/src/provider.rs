use async_trait::async_trait;
use std::fmt::Debug;

use crate::{Config, ForecastResult, Location, error::FetchError, provider::weatherapi::WeatherApiProvider};

pub mod weatherapi;

/// Forecast horizon requested from the provider, in days.
pub const FORECAST_DAYS: u8 = 7;

/// Source of seven-day forecasts.
///
/// One call is one outbound request. Implementations must not retry.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(&self, location: &Location) -> Result<ForecastResult, FetchError>;
}

/// Construct the WeatherAPI.com provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<WeatherApiProvider> {
    let api_key = config.resolve_api_key()?;

    let provider = match config.base_url.as_deref() {
        Some(base) => WeatherApiProvider::with_base_url(api_key, base),
        None => WeatherApiProvider::new(api_key),
    };

    Ok(provider)
}
