use forecast_core::{
    FetchStatus, Theme, ViewState,
    view::{PLACEHOLDER, format_measure, format_temp, forecast_rows},
};

/// Render the whole view as plain text.
///
/// An error replaces everything else on screen.
pub fn render(state: &ViewState, theme: Theme) -> String {
    let location = state.location.as_ref().map_or("", |l| l.as_str());

    match &state.status {
        FetchStatus::Failed(message) => format!("Error: {message}"),
        FetchStatus::Idle => format!("{}\nEnter a location to load the forecast.", header(location, theme)),
        FetchStatus::Loading => format!("{}\nLoading...", header(location, theme)),
        FetchStatus::Success(result) => {
            let name = state.location.as_ref().map_or_else(|| location.to_string(), |l| result.display_name(l));
            let icon = state.derived.as_ref().map(|d| d.current_icon()).unwrap_or_default();

            let mut lines = vec![
                header(&name, theme),
                "Current Weather".to_string(),
                format!("{} {}℃", icon.glyph(), format_temp(result.current.temp_c)),
                result.current.condition.text.clone().unwrap_or_default(),
                format!("Humidity    {}%", format_measure(result.current.humidity)),
                format!("Wind Speed  {} km/h", format_measure(result.current.wind_kph)),
                format!("Sunrise     {}", result.sunrise().unwrap_or(PLACEHOLDER)),
            ];

            if let Some(derived) = &state.derived {
                lines.push(String::new());
                lines.push("Day Forecast".to_string());
                lines.extend(forecast_rows(result, &derived.calendar_slots).into_iter().map(|row| {
                    format!(
                        "{:<4}{:<8}{:<10} {} {:<24}{}°C / {}°C",
                        row.slot.day,
                        row.slot.date,
                        row.slot.time,
                        row.icon.glyph(),
                        row.condition_text,
                        row.max_temp,
                        row.min_temp,
                    )
                }));
            }

            lines.join("\n")
        }
    }
}

fn header(name: &str, theme: Theme) -> String {
    format!("Weather for {name}    [{} {}]\n", theme.toggle_glyph(), theme.toggle())
}
