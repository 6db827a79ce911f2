//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & API key handling
//! - The forecast provider abstraction and its WeatherAPI.com implementation
//! - The query controller that owns fetch state
//! - Derived view state (calendar window, condition icons, formatting)
//!
//! It is used by `forecast-cli`, but can also back other front-ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod theme;
pub mod view;

pub use config::Config;
pub use controller::{FetchStatus, ForecastController, ViewState};
pub use error::{FetchError, LocationError};
pub use model::{ForecastResult, Location};
pub use provider::{ForecastProvider, provider_from_config, weatherapi::WeatherApiProvider};
pub use theme::Theme;
pub use view::{CalendarSlot, ConditionIcon, ConditionIconKey, DerivedView, ForecastRow};
