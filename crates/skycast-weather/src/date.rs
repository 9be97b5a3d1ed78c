//! Date argument handling for weather queries.

use chrono::{Duration, Local, NaiveDate};

use crate::error::WeatherError;

/// Historical limit (about 2 years back).
const MAX_HISTORY_DAYS: i64 = 730;
/// Forecast limit.
const MAX_FORECAST_DAYS: i64 = 16;

/// Which day a query asks about. `Today` dispatches to current conditions;
/// any other date goes through the source's forecast capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedDate {
    Today,
    OnDate(NaiveDate),
}

impl RequestedDate {
    /// Parse a `--date` argument: `today`, `tomorrow`, or `MMDDYYYY`.
    /// `None` means today. Dates outside the supported window fail here,
    /// before any network traffic.
    pub fn parse(input: Option<&str>) -> Result<Self, WeatherError> {
        let Some(input) = input else {
            return Ok(Self::Today);
        };
        let today = Local::now().date_naive();

        let date = match input.to_ascii_lowercase().as_str() {
            "today" => return Ok(Self::Today),
            "tomorrow" => today + Duration::days(1),
            _ => parse_mmddyyyy(input).ok_or_else(|| WeatherError::InvalidDate {
                input: input.to_string(),
                reason: "expected MMDDYYYY, today or tomorrow".to_string(),
            })?,
        };

        if date == today {
            return Ok(Self::Today);
        }

        let earliest = today - Duration::days(MAX_HISTORY_DAYS);
        if date < earliest {
            return Err(WeatherError::InvalidDate {
                input: input.to_string(),
                reason: format!("too far in the past (earliest supported: {earliest})"),
            });
        }

        let latest = today + Duration::days(MAX_FORECAST_DAYS);
        if date > latest {
            return Err(WeatherError::InvalidDate {
                input: input.to_string(),
                reason: format!("too far in the future (latest supported: {latest})"),
            });
        }

        Ok(Self::OnDate(date))
    }

    /// The date component of the cache key.
    pub fn cache_component(&self) -> String {
        match self {
            Self::Today => "current".to_string(),
            Self::OnDate(date) => date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Today => None,
            Self::OnDate(date) => Some(*date),
        }
    }
}

fn parse_mmddyyyy(input: &str) -> Option<NaiveDate> {
    if input.len() != 8 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month: u32 = input[..2].parse().ok()?;
    let day: u32 = input[2..4].parse().ok()?;
    let year: i32 = input[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
