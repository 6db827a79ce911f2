use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LocationError;

/// Free-text place name used as the fetch key. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location(String);

impl Location {
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LocationError::Empty);
        }
        Ok(Location(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Location {
    type Error = LocationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Location::parse(value)
    }
}

// The provider payload. Every field the view consumes is optional so a sparse
// response degrades to placeholders instead of failing to decode.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastResult {
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationInfo {
    pub name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_kph: Option<f64>,
    pub condition: Condition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastDay {
    pub day: DaySummary,
    pub astro: Astro,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaySummary {
    pub maxtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub condition: Condition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Astro {
    pub sunrise: Option<String>,
}

impl ForecastResult {
    pub fn day(&self, index: usize) -> Option<&ForecastDay> {
        self.forecast.forecastday.get(index)
    }

    /// Sunrise of the first forecast day.
    pub fn sunrise(&self) -> Option<&str> {
        self.day(0).and_then(|d| d.astro.sunrise.as_deref())
    }

    /// Provider's resolved place name with country, or the queried location
    /// if it sent no name.
    pub fn display_name(&self, queried: &Location) -> String {
        match (&self.location.name, &self.location.country) {
            (Some(name), Some(country)) => format!("{name}, {country}"),
            (Some(name), None) => name.clone(),
            (None, _) => queried.to_string(),
        }
    }
}
