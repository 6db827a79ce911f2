//! Derived view state: the seven-day calendar window and condition icons.
//!
//! Everything here is a pure function of a [`ForecastResult`], a locale and a
//! reference instant, so it is recomputed once per successful fetch rather than
//! per render.

use chrono::{DateTime, Days, Locale, TimeDelta, TimeZone};
use serde::Serialize;
use std::fmt;

use crate::model::ForecastResult;

/// Number of rows in the calendar window: today plus six days.
pub const CALENDAR_DAYS: usize = 7;

/// Rendered in place of any missing number.
pub const PLACEHOLDER: &str = "--";

const DEFAULT_CONDITION_TEXT: &str = "Clear";

/// Display categories for a weather condition.
///
/// Any condition text that does not normalize to one of these keys maps to
/// [`ConditionIcon::Clear`], so lookup never yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionIcon {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Snow,
    Showers,
    Sunny,
}

impl ConditionIcon {
    pub const fn all() -> &'static [ConditionIcon] {
        &[
            ConditionIcon::Clear,
            ConditionIcon::PartlyCloudy,
            ConditionIcon::Cloudy,
            ConditionIcon::Rain,
            ConditionIcon::Snow,
            ConditionIcon::Showers,
            ConditionIcon::Sunny,
        ]
    }

    pub fn from_key(key: &str) -> Self {
        match key {
            "clear" => ConditionIcon::Clear,
            "partly_cloudy" => ConditionIcon::PartlyCloudy,
            "cloudy" => ConditionIcon::Cloudy,
            "rain" => ConditionIcon::Rain,
            "snow" => ConditionIcon::Snow,
            "showers" => ConditionIcon::Showers,
            "sunny" => ConditionIcon::Sunny,
            _ => ConditionIcon::Clear,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ConditionIcon::Clear => "clear",
            ConditionIcon::PartlyCloudy => "partly_cloudy",
            ConditionIcon::Cloudy => "cloudy",
            ConditionIcon::Rain => "rain",
            ConditionIcon::Snow => "snow",
            ConditionIcon::Showers => "showers",
            ConditionIcon::Sunny => "sunny",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ConditionIcon::Clear | ConditionIcon::Sunny => "☀️",
            ConditionIcon::PartlyCloudy => "⛅",
            ConditionIcon::Cloudy => "☁️",
            ConditionIcon::Rain => "🌧️",
            ConditionIcon::Snow => "❄️",
            ConditionIcon::Showers => "🌦️",
        }
    }
}

/// Condition text normalized for icon lookup: lowercased, each whitespace run
/// replaced by one underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConditionIconKey(String);

impl ConditionIconKey {
    /// Absent text is treated as "clear".
    pub fn from_text(text: Option<&str>) -> Self {
        let lowered = text.unwrap_or("clear").to_lowercase();

        let mut key = String::with_capacity(lowered.len());
        let mut in_space = false;
        for ch in lowered.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    key.push('_');
                }
                in_space = true;
            } else {
                key.push(ch);
                in_space = false;
            }
        }

        ConditionIconKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn icon(&self) -> ConditionIcon {
        ConditionIcon::from_key(&self.0)
    }
}

impl Default for ConditionIconKey {
    fn default() -> Self {
        ConditionIconKey::from_text(None)
    }
}

impl fmt::Display for ConditionIconKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the calendar window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSlot {
    /// Short weekday, e.g. "Mon".
    pub day: String,
    /// Short date, e.g. "19 Oct".
    pub date: String,
    /// Generation time, shared by all seven slots.
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedView {
    pub calendar_slots: [CalendarSlot; CALENDAR_DAYS],
    pub current_icon_key: ConditionIconKey,
}

impl DerivedView {
    pub fn current_icon(&self) -> ConditionIcon {
        self.current_icon_key.icon()
    }
}

/// A calendar slot joined with the forecast day at the same offset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub slot: CalendarSlot,
    pub condition_text: String,
    pub icon: ConditionIcon,
    pub max_temp: String,
    pub min_temp: String,
}

/// Build the calendar window and current icon key from a fetch result.
///
/// Always yields seven slots, whatever the number of forecast days.
pub fn derive_view_state<Tz>(result: &ForecastResult, locale: Locale, now: &DateTime<Tz>) -> DerivedView
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let time = now.format_localized("%I:%M %p", locale).to_string();

    let calendar_slots = std::array::from_fn(|offset| {
        let date = day_offset(now, offset as u64);
        CalendarSlot {
            day: date.format_localized("%a", locale).to_string(),
            date: date.format_localized("%-d %b", locale).to_string(),
            time: time.clone(),
        }
    });

    DerivedView {
        calendar_slots,
        current_icon_key: ConditionIconKey::from_text(result.current.condition.text.as_deref()),
    }
}

/// Zip the calendar window with the forecast days. Missing days get
/// placeholder temperatures and the "Clear" condition.
pub fn forecast_rows(result: &ForecastResult, slots: &[CalendarSlot; CALENDAR_DAYS]) -> Vec<ForecastRow> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| {
            let day = result.day(index).map(|d| &d.day);
            let condition_text = day
                .and_then(|d| d.condition.text.as_deref())
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_CONDITION_TEXT)
                .to_string();
            let icon = ConditionIconKey::from_text(Some(&condition_text)).icon();

            ForecastRow {
                slot: slot.clone(),
                condition_text,
                icon,
                max_temp: format_temp(day.and_then(|d| d.maxtemp_c)),
                min_temp: format_temp(day.and_then(|d| d.mintemp_c)),
            }
        })
        .collect()
}

/// Round to the nearest whole degree; missing renders as "--".
pub fn format_temp(temp: Option<f64>) -> String {
    match temp {
        Some(t) if t.is_finite() => {
            let rounded = t.round() as i64;
            rounded.to_string()
        }
        _ => PLACEHOLDER.to_string(),
    }
}

/// Show a reading as the provider sent it; missing renders as "--".
pub fn format_measure(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |v| v.to_string())
}

fn day_offset<Tz: TimeZone>(now: &DateTime<Tz>, offset: u64) -> DateTime<Tz> {
    // Calendar arithmetic first; fixed 24h steps only if the local date is unrepresentable.
    now.clone()
        .checked_add_days(Days::new(offset))
        .unwrap_or_else(|| now.clone() + TimeDelta::days(offset as i64))
}
