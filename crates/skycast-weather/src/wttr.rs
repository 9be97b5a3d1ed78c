//! wttr.in weather source. Current conditions only.
//!
//! The j1 format serializes every number as a string; fields that fail to
//! parse are left empty rather than guessed at.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::SourceError;
use crate::source::WeatherSource;
use crate::types::{Coordinates, CurrentConditions, UnitLabels, Units, WeatherReport};

pub const SOURCE_NAME: &str = "wttr";

const BASE_URL: &str = "https://wttr.in";

#[derive(Debug, Deserialize)]
struct WttrResponse {
    #[serde(default)]
    current_condition: Vec<WttrCurrent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WttrCurrent {
    #[serde(rename = "temp_C")]
    temp_c: Option<String>,
    #[serde(rename = "temp_F")]
    temp_f: Option<String>,
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: Option<String>,
    #[serde(rename = "FeelsLikeF")]
    feels_like_f: Option<String>,
    humidity: Option<String>,
    windspeed_kmph: Option<String>,
    windspeed_miles: Option<String>,
    winddir_degree: Option<String>,
    pressure: Option<String>,
    cloudcover: Option<String>,
    #[serde(rename = "uvIndex")]
    uv_index: Option<String>,
    #[serde(rename = "precipMM")]
    precip_mm: Option<String>,
    #[serde(rename = "precipInches")]
    precip_inches: Option<String>,
    #[serde(default)]
    weather_desc: Vec<WttrDesc>,
}

#[derive(Debug, Deserialize)]
struct WttrDesc {
    value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WttrSource {
    client: Client,
    base_url: String,
}

impl WttrSource {
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
}

#[async_trait]
impl WeatherSource for WttrSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_current(
        &self,
        location: &Coordinates,
        units: Units,
    ) -> Result<WeatherReport, SourceError> {
        let url = format!(
            "{}/{:.4},{:.4}?format=j1",
            self.base_url, location.latitude, location.longitude,
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::transport(SOURCE_NAME, e))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Rejected {
                src: SOURCE_NAME,
                reason: if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body.chars().take(200).collect()
                },
            });
        }
        if !status.is_success() {
            return Err(SourceError::Unavailable {
                src: SOURCE_NAME,
                reason: format!("HTTP {status}"),
            });
        }

        let body: WttrResponse = response.json().await.map_err(|e| SourceError::Unavailable {
            src: SOURCE_NAME,
            reason: format!("invalid response: {e}"),
        })?;

        let current = body
            .current_condition
            .into_iter()
            .next()
            .map(|c| conditions_from(c, units))
            .unwrap_or_default();

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
}

fn conditions_from(current: WttrCurrent, units: Units) -> CurrentConditions {
    let (temperature, apparent, wind_speed, precipitation) = match units {
        Units::Metric => (
            parse_opt(current.temp_c),
            parse_opt(current.feels_like_c),
            parse_opt(current.windspeed_kmph),
            parse_opt(current.precip_mm),
        ),
        Units::Imperial => (
            parse_opt(current.temp_f),
            parse_opt(current.feels_like_f),
            parse_opt(current.windspeed_miles),
            parse_opt(current.precip_inches),
        ),
    };

    CurrentConditions {
        temperature,
        apparent_temperature: apparent,
        humidity: parse_opt(current.humidity),
        wind_speed,
        wind_direction: parse_opt(current.winddir_degree),
        wind_gusts: None,
        condition: current
            .weather_desc
            .into_iter()
            .next()
            .and_then(|d| d.value)
            .map(|v| v.trim().to_string()),
        weather_code: None,
        pressure: parse_opt(current.pressure),
        cloud_cover: parse_opt(current.cloudcover),
        visibility: None,
        uv_index: parse_opt(current.uv_index),
        precipitation,
    }
}

fn parse_opt(value: Option<String>) -> Option<f64> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn nyc() -> Coordinates {
        Coordinates::named(40.7128, -74.0060, "New York").unwrap()
    }

    fn j1_body() -> serde_json::Value {
        json!({
            "current_condition": [{
                "temp_C": "18",
                "temp_F": "64",
                "FeelsLikeC": "17",
                "FeelsLikeF": "63",
                "humidity": "71",
                "windspeedKmph": "15",
                "windspeedMiles": "9",
                "winddirDegree": "250",
                "pressure": "1012",
                "cloudcover": "50",
                "uvIndex": "4",
                "precipMM": "0.1",
                "precipInches": "0.0",
                "weatherDesc": [{"value": "Partly cloudy"}]
            }]
        })
    }

    #[tokio::test]
    async fn test_fetch_current_metric() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/40.7128,-74.0060"))
            .and(query_param("format", "j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(j1_body()))
            .mount(&server)
            .await;

        let source = WttrSource::with_base_url(Duration::from_secs(5), &server.uri());
        let report = source.fetch_current(&nyc(), Units::Metric).await.unwrap();

        assert_eq!(report.source, "wttr");
        assert_eq!(report.current.temperature, Some(18.0));
        assert_eq!(report.current.wind_speed, Some(15.0));
        assert_eq!(report.current.condition.as_deref(), Some("Partly cloudy"));
        assert_eq!(report.current.weather_code, None);
    }

    #[tokio::test]
    async fn test_fetch_current_imperial() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/40.7128,-74.0060"))
            .respond_with(ResponseTemplate::new(200).set_body_json(j1_body()))
            .mount(&server)
            .await;

        let source = WttrSource::with_base_url(Duration::from_secs(5), &server.uri());
        let report = source.fetch_current(&nyc(), Units::Imperial).await.unwrap();
        assert_eq!(report.current.temperature, Some(64.0));
        assert_eq!(report.current.wind_speed, Some(9.0));
    }

    #[tokio::test]
    async fn test_unparseable_fields_stay_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/40.7128,-74.0060"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current_condition": [{
                    "temp_C": "not a number",
                    "humidity": "71"
                }]
            })))
            .mount(&server)
            .await;

        let source = WttrSource::with_base_url(Duration::from_secs(5), &server.uri());
        let report = source.fetch_current(&nyc(), Units::Metric).await.unwrap();
        assert_eq!(report.current.temperature, None);
        assert_eq!(report.current.humidity, Some(71.0));
    }

    #[tokio::test]
    async fn test_forecast_is_unsupported() {
        let source = WttrSource::with_base_url(Duration::from_secs(5), "http://127.0.0.1:9");
        let date = NaiveDate::from_ymd_opt(2025, 8, 9).unwrap();
        let err = source
            .fetch_forecast(&nyc(), date, Units::Metric)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SourceError::Unsupported {
                src: "wttr",
                operation: "forecast"
            }
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/40.7128,-74.0060"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = WttrSource::with_base_url(Duration::from_secs(5), &server.uri());
        let err = source
            .fetch_current(&nyc(), Units::Metric)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unavailable { .. }));
    }
}
