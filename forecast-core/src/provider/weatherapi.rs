use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    error::FetchError,
    model::{ForecastResult, Location},
    provider::FORECAST_DAYS,
};

use super::ForecastProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server in tests.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        let endpoint = format!("{}/forecast.json", base_url.trim_end_matches('/'));
        Self { api_key, endpoint, http: Client::new() }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    async fn fetch_forecast(&self, location: &Location) -> Result<ForecastResult, FetchError> {
        let days = FORECAST_DAYS.to_string();

        debug!(location = %location, endpoint = %self.endpoint, "requesting forecast");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", location.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::http(status.as_u16(), &body));
        }

        let parsed: ForecastResult = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}
