use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Axis, LocationError};

/// Unit system preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "metric" => Some(Units::Metric),
            "imperial" => Some(Units::Imperial),
            _ => None,
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic location, validated on construction.
///
/// Deserialization goes through the same validation, so an out-of-range
/// pair cannot re-enter through the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CoordinatesRepr")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CoordinatesRepr {
    latitude: f64,
    longitude: f64,
    name: Option<String>,
}

impl TryFrom<CoordinatesRepr> for Coordinates {
    type Error = LocationError;

    fn try_from(repr: CoordinatesRepr) -> Result<Self, Self::Error> {
        let mut coords = Coordinates::new(repr.latitude, repr.longitude)?;
        coords.name = repr.name;
        Ok(coords)
    }
}

impl Coordinates {
    /// Validate and construct a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(LocationError::InvalidCoordinate {
                axis: Axis::Latitude,
                value: latitude,
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::InvalidCoordinate {
                axis: Axis::Longitude,
                value: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
            name: None,
        })
    }

    /// Validate and construct with a human-readable label.
    pub fn named(
        latitude: f64,
        longitude: f64,
        name: impl Into<String>,
    ) -> Result<Self, LocationError> {
        let mut coords = Self::new(latitude, longitude)?;
        coords.name = Some(name.into());
        Ok(coords)
    }

    /// Fixed-precision form used as cache key material.
    ///
    /// Four decimal places, so float jitter from repeated geocoding of the
    /// same place cannot fragment the cache.
    pub fn cache_fragment(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({:.4}, {:.4})", name, self.latitude, self.longitude),
            None => write!(f, "{:.4}, {:.4}", self.latitude, self.longitude),
        }
    }
}

/// Current conditions, normalized across providers.
///
/// Everything is optional: providers vary, and unsupported fields stay
/// empty rather than fabricated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gusts: Option<f64>,
    pub condition: Option<String>,
    pub weather_code: Option<i32>,
    pub pressure: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub visibility: Option<f64>,
    pub uv_index: Option<f64>,
    pub precipitation: Option<f64>,
}

/// One-day aggregate for per-date queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailySummary {
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub condition: Option<String>,
    pub weather_code: Option<i32>,
    pub precipitation_sum: Option<f64>,
    pub wind_speed_max: Option<f64>,
    pub uv_index_max: Option<f64>,
}

/// Display suffixes for the chosen unit system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitLabels {
    pub temperature: String,
    pub wind_speed: String,
    pub pressure: String,
    pub precipitation: String,
    pub humidity: String,
}

impl UnitLabels {
    pub fn for_units(units: Units) -> Self {
        match units {
            Units::Metric => Self {
                temperature: "°C".to_string(),
                wind_speed: "km/h".to_string(),
                pressure: "hPa".to_string(),
                precipitation: "mm".to_string(),
                humidity: "%".to_string(),
            },
            Units::Imperial => Self {
                temperature: "°F".to_string(),
                wind_speed: "mph".to_string(),
                pressure: "hPa".to_string(),
                precipitation: "in".to_string(),
                humidity: "%".to_string(),
            },
        }
    }
}

/// Normalized weather response handed to formatting.
///
/// `cache_hit` is stamped by the pipeline; sources always emit `false`
/// since they have no visibility into cache state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: Coordinates,
    pub current: CurrentConditions,
    pub daily: Option<DailySummary>,
    pub units: UnitLabels,
    pub source: String,
    pub timestamp: DateTime<Utc>,
    pub forecast_date: Option<NaiveDate>,
    pub cache_hit: bool,
}

/// Human-readable condition for a WMO weather interpretation code.
/// See: https://open-meteo.com/en/docs#weathervariables
pub fn wmo_description(code: i32) -> String {
    let known = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => return format!("Unknown ({code})"),
    };
    known.to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_valid_coordinates() {
        let coords = Coordinates::named(40.7128, -74.0060, "NYC").unwrap();
        assert_eq!(coords.latitude, 40.7128);
        assert_eq!(coords.longitude, -74.0060);
        assert_eq!(coords.name.as_deref(), Some("NYC"));
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(Coordinates::new(0.0, 0.0).is_ok());
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_invalid_latitude() {
        let err = Coordinates::new(91.0, 0.0).unwrap_err();
        match err {
            LocationError::InvalidCoordinate { axis, value } => {
                assert_eq!(axis, Axis::Latitude);
                assert_eq!(value, 91.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(Coordinates::new(-91.0, 0.0).is_err());
    }

    #[test]
    fn test_invalid_longitude() {
        let err = Coordinates::new(0.0, 181.0).unwrap_err();
        match err {
            LocationError::InvalidCoordinate { axis, value } => {
                assert_eq!(axis, Axis::Longitude);
                assert_eq!(value, 181.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(Coordinates::new(0.0, -181.0).is_err());
    }

    #[test]
    fn test_cache_fragment_rounds_to_four_decimals() {
        let coords = Coordinates::new(40.7128456, -74.0060789).unwrap();
        assert_eq!(coords.cache_fragment(), "40.7128,-74.0061");
    }

    #[test]
    fn test_display() {
        let coords = Coordinates::new(40.7128, -74.0060).unwrap();
        assert_eq!(coords.to_string(), "40.7128, -74.0060");

        let named = Coordinates::named(40.7128, -74.0060, "NYC").unwrap();
        assert_eq!(named.to_string(), "NYC (40.7128, -74.0060)");
    }

    #[test]
    fn test_deserialization_revalidates() {
        let good: Result<Coordinates, _> =
            serde_json::from_str(r#"{"latitude": 40.0, "longitude": -74.0, "name": null}"#);
        assert!(good.is_ok());

        let bad: Result<Coordinates, _> =
            serde_json::from_str(r#"{"latitude": 91.0, "longitude": 0.0, "name": null}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_wmo_description() {
        assert_eq!(wmo_description(0), "Clear sky");
        assert_eq!(wmo_description(95), "Thunderstorm");
        assert_eq!(wmo_description(1234), "Unknown (1234)");
    }

    #[test]
    fn test_units_round_trip_names() {
        assert_eq!(Units::from_name("metric"), Some(Units::Metric));
        assert_eq!(Units::from_name("imperial"), Some(Units::Imperial));
        assert_eq!(Units::from_name("kelvin"), None);
        assert_eq!(Units::Imperial.as_str(), "imperial");
    }
}
