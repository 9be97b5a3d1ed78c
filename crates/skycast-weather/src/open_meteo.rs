//! Open-Meteo weather source. Global coverage, no API key.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::SourceError;
use crate::source::WeatherSource;
use crate::types::{
    wmo_description, Coordinates, CurrentConditions, DailySummary, UnitLabels, Units,
    WeatherReport,
};

pub const SOURCE_NAME: &str = "open-meteo";

const BASE_URL: &str = "https://api.open-meteo.com";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
weather_code,wind_speed_10m,wind_direction_10m,wind_gusts_10m,pressure_msl,cloud_cover,\
visibility,uv_index,precipitation";

const DAILY_FIELDS: &str =
    "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum,wind_speed_10m_max,\
uv_index_max";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    apparent_temperature: Option<f64>,
    weather_code: Option<i32>,
    wind_speed_10m: Option<f64>,
    wind_direction_10m: Option<f64>,
    wind_gusts_10m: Option<f64>,
    pressure_msl: Option<f64>,
    cloud_cover: Option<f64>,
    visibility: Option<f64>,
    uv_index: Option<f64>,
    precipitation: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    weather_code: Vec<Option<i32>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f64>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    client: Client,
    base_url: String,
}

impl OpenMeteoSource {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::transport(SOURCE_NAME, e))?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_url(timeout: Duration, base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.to_string(),
        }
    }

    fn unit_params(units: Units) -> &'static str {
        match units {
            Units::Metric => {
                "&temperature_unit=celsius&wind_speed_unit=kmh&precipitation_unit=mm"
            }
            Units::Imperial => {
                "&temperature_unit=fahrenheit&wind_speed_unit=mph&precipitation_unit=inch"
            }
        }
    }

    async fn send(&self, url: &str) -> Result<ForecastResponse, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::transport(SOURCE_NAME, e))?;

        let status = response.status();
        if status.is_client_error() {
            // Open-Meteo reports problems as {"error": true, "reason": "..."}
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiError>(&body)
                .ok()
                .and_then(|e| e.reason)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(SourceError::Rejected {
                src: SOURCE_NAME,
                reason,
            });
        }
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                src: SOURCE_NAME,
                reason: format!("HTTP {status}"),
            });
        }

        response.json().await.map_err(|e| SourceError::Unavailable {
            src: SOURCE_NAME,
            reason: format!("invalid response: {e}"),
        })
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_current(
        &self,
        location: &Coordinates,
        units: Units,
    ) -> Result<WeatherReport, SourceError> {
        let url = format!(
            "{}/v1/forecast?latitude={:.4}&longitude={:.4}&current={}&timezone=auto&forecast_days=1{}",
            self.base_url,
            location.latitude,
            location.longitude,
            CURRENT_FIELDS,
            Self::unit_params(units),
        );

        let body = self.send(&url).await?;
        let current = body.current.map(conditions_from).unwrap_or_default();

        Ok(WeatherReport {
            location: location.clone(),
            current,
            daily: None,
            units: UnitLabels::for_units(units),
            source: SOURCE_NAME.to_string(),
            timestamp: Utc::now(),
            forecast_date: None,
            cache_hit: false,
        })
    }

    async fn fetch_forecast(
        &self,
        location: &Coordinates,
        date: NaiveDate,
        units: Units,
    ) -> Result<WeatherReport, SourceError> {
        let day = date.format("%Y-%m-%d");
        let url = format!(
            "{}/v1/forecast?latitude={:.4}&longitude={:.4}&daily={}&start_date={day}&end_date={day}&timezone=auto{}",
            self.base_url,
            location.latitude,
            location.longitude,
            DAILY_FIELDS,
            Self::unit_params(units),
        );

        let body = self.send(&url).await?;
        let daily = body.daily.unwrap_or_default();
        let summary = summary_from(&daily).ok_or_else(|| SourceError::Rejected {
            src: SOURCE_NAME,
            reason: format!("no data for {date}"),
        })?;

        Ok(WeatherReport {
            location: location.clone(),
            current: CurrentConditions::default(),
            daily: Some(summary),
            units: UnitLabels::for_units(units),
            source: SOURCE_NAME.to_string(),
            timestamp: Utc::now(),
            forecast_date: Some(date),
            cache_hit: false,
        })
    }
}

fn conditions_from(block: CurrentBlock) -> CurrentConditions {
    CurrentConditions {
        temperature: block.temperature_2m,
        apparent_temperature: block.apparent_temperature,
        humidity: block.relative_humidity_2m,
        wind_speed: block.wind_speed_10m,
        wind_direction: block.wind_direction_10m,
        wind_gusts: block.wind_gusts_10m,
        condition: block.weather_code.map(wmo_description),
        weather_code: block.weather_code,
        pressure: block.pressure_msl,
        cloud_cover: block.cloud_cover,
        visibility: block.visibility,
        uv_index: block.uv_index,
        precipitation: block.precipitation,
    }
}

/// First day of the daily block, or `None` when the provider sent nothing.
fn summary_from(daily: &DailyBlock) -> Option<DailySummary> {
    let weather_code = daily.weather_code.first().copied().flatten();
    let high = daily.temperature_2m_max.first().copied().flatten();
    let low = daily.temperature_2m_min.first().copied().flatten();
    let precipitation_sum = daily.precipitation_sum.first().copied().flatten();
    let wind_speed_max = daily.wind_speed_10m_max.first().copied().flatten();
    let uv_index_max = daily.uv_index_max.first().copied().flatten();

    if weather_code.is_none() && high.is_none() && low.is_none() {
        return None;
    }

    Some(DailySummary {
        high,
        low,
        condition: weather_code.map(wmo_description),
        weather_code,
        precipitation_sum,
        wind_speed_max,
        uv_index_max,
    })
}
