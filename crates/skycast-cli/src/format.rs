//! Output rendering for weather reports.

use skycast_weather::WeatherReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Simple,
    Visual,
    Raw,
}

impl OutputFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "simple" => Some(Self::Simple),
            "visual" => Some(Self::Visual),
            "raw" => Some(Self::Raw),
            _ => None,
        }
    }
}

pub fn render(format: OutputFormat, report: &WeatherReport) -> String {
    match format {
        OutputFormat::Simple => render_simple(report),
        OutputFormat::Visual => render_visual(report),
        OutputFormat::Raw => render_raw(report),
    }
}

/// Labelled lines, one per known value. Absent fields are skipped.
fn render_simple(report: &WeatherReport) -> String {
    let mut lines = Vec::new();

    let mut header = report.location.to_string();
    if report.cache_hit {
        header.push_str(" (cached)");
    }
    lines.push(header);

    if let Some(daily) = &report.daily {
        if let Some(date) = report.forecast_date {
            lines.push(format!("Forecast for {date}"));
        }
        if let Some(condition) = &daily.condition {
            lines.push(format!("Conditions: {condition}"));
        }
        match (daily.high, daily.low) {
            (Some(high), Some(low)) => lines.push(format!(
                "High / Low: {high:.1}{t} / {low:.1}{t}",
                t = report.units.temperature
            )),
            (Some(high), None) => {
                lines.push(format!("High: {high:.1}{}", report.units.temperature));
            }
            (None, Some(low)) => {
                lines.push(format!("Low: {low:.1}{}", report.units.temperature));
            }
            (None, None) => {}
        }
        if let Some(precipitation) = daily.precipitation_sum {
            lines.push(format!(
                "Precipitation: {precipitation:.1} {}",
                report.units.precipitation
            ));
        }
        if let Some(wind) = daily.wind_speed_max {
            lines.push(format!("Max wind: {wind:.1} {}", report.units.wind_speed));
        }
        if let Some(uv) = daily.uv_index_max {
            lines.push(format!("Max UV index: {uv:.1}"));
        }
    } else {
        let current = &report.current;
        if let Some(condition) = &current.condition {
            lines.push(format!("Conditions: {condition}"));
        }
        if let Some(temperature) = current.temperature {
            let mut line = format!("Temperature: {temperature:.1}{}", report.units.temperature);
            if let Some(apparent) = current.apparent_temperature {
                line.push_str(&format!(
                    " (feels like {apparent:.1}{})",
                    report.units.temperature
                ));
            }
            lines.push(line);
        }
        if let Some(humidity) = current.humidity {
            lines.push(format!("Humidity: {humidity:.0}{}", report.units.humidity));
        }
        if let Some(wind) = current.wind_speed {
            let mut line = format!("Wind: {wind:.1} {}", report.units.wind_speed);
            if let Some(direction) = current.wind_direction {
                line.push_str(&format!(" from {direction:.0}°"));
            }
            if let Some(gusts) = current.wind_gusts {
                line.push_str(&format!(", gusts {gusts:.1} {}", report.units.wind_speed));
            }
            lines.push(line);
        }
        if let Some(pressure) = current.pressure {
            lines.push(format!("Pressure: {pressure:.1} {}", report.units.pressure));
        }
        if let Some(cloud_cover) = current.cloud_cover {
            lines.push(format!("Cloud cover: {cloud_cover:.0}%"));
        }
        if let Some(uv) = current.uv_index {
            lines.push(format!("UV index: {uv:.1}"));
        }
        if let Some(precipitation) = current.precipitation {
            lines.push(format!(
                "Precipitation: {precipitation:.1} {}",
                report.units.precipitation
            ));
        }
    }

    lines.push(format!("Source: {}", report.source));
    lines.join("\n")
}

/// The simple rendering inside a box-drawing panel.
fn render_visual(report: &WeatherReport) -> String {
    let body = render_simple(report);
    let width = body.lines().map(|l| l.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    out.push('┌');
    out.push_str(&"─".repeat(width + 2));
    out.push_str("┐\n");
    for line in body.lines() {
        let padding = width - line.chars().count();
        out.push_str("│ ");
        out.push_str(line);
        out.push_str(&" ".repeat(padding));
        out.push_str(" │\n");
    }
    out.push('└');
    out.push_str(&"─".repeat(width + 2));
    out.push('┘');
    out
}

/// The full normalized report as pretty JSON.
fn render_raw(report: &WeatherReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}
