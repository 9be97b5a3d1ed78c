//! Error types for location resolution, weather sources and the pipeline.

use thiserror::Error;

/// Coordinate axis, used to point at the offending half of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Valid range, rendered into error messages.
    pub fn bounds(&self) -> &'static str {
        match self {
            Axis::Latitude => "-90..90",
            Axis::Longitude => "-180..180",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

/// Location resolution errors.
#[derive(Debug, Error)]
pub enum LocationError {
    /// Input was coordinate syntax but a value is out of range.
    #[error("invalid {axis}: {value} (valid range {})", .axis.bounds())]
    InvalidCoordinate { axis: Axis, value: f64 },

    /// Input committed to coordinate syntax but could not be parsed.
    #[error("unparseable coordinates: {0}")]
    Syntax(String),

    /// Exactly one of the explicit latitude/longitude overrides was given.
    #[error("both latitude and longitude must be supplied together")]
    IncompleteOverride,

    /// The geocoder returned no results for the query.
    #[error("place not found: {0}")]
    PlaceNotFound(String),

    /// The location service could not be reached or answered garbage.
    #[error("could not reach location service: {0}")]
    GeocodingUnavailable(String),
}

impl LocationError {
    /// Whether retrying the same query might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LocationError::GeocodingUnavailable(_))
    }
}

/// Per-call weather source errors. Every variant names the failing source
/// so a caller can retry with a different one.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure or timeout. Retryable by the caller; never retried here.
    #[error("weather source {src} unreachable: {reason}")]
    Unavailable { src: &'static str, reason: String },

    /// The provider answered with a well-formed error.
    #[error("weather source {src} rejected the request: {reason}")]
    Rejected { src: &'static str, reason: String },

    /// The source lacks the requested capability.
    #[error("{operation} is not supported by source {src}")]
    Unsupported {
        src: &'static str,
        operation: &'static str,
    },
}

impl SourceError {
    /// Name of the source the call failed against.
    pub fn source_name(&self) -> &'static str {
        match self {
            SourceError::Unavailable { src, .. }
            | SourceError::Rejected { src, .. }
            | SourceError::Unsupported { src, .. } => src,
        }
    }

    /// Whether retrying the same query might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SourceError::Unavailable { .. })
    }

    /// Classify a transport-level reqwest failure.
    pub(crate) fn transport(source: &'static str, err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        SourceError::Unavailable { src: source, reason }
    }
}

/// Top-level pipeline error: a query fully succeeds with a report or fully
/// fails with exactly one of these.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("unknown weather source: {0}")]
    UnknownSource(String),

    #[error("invalid date {input}: {reason}")]
    InvalidDate { input: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_coordinate_names_axis_and_value() {
        let err = LocationError::InvalidCoordinate {
            axis: Axis::Latitude,
            value: 91.0,
        };
        let message = err.to_string();
        assert!(message.contains("latitude"));
        assert!(message.contains("91"));
        assert!(message.contains("-90..90"));
    }

    #[test]
    fn test_source_error_names_source() {
        let err = SourceError::Rejected {
            src: "open-meteo",
            reason: "bad date".to_string(),
        };
        assert_eq!(err.source_name(), "open-meteo");
        assert!(err.to_string().contains("open-meteo"));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SourceError::Unavailable {
            src: "open-meteo",
            reason: "timeout".to_string()
        }
        .is_retryable());
        assert!(!SourceError::Unsupported {
            src: "wttr",
            operation: "forecast"
        }
        .is_retryable());
        assert!(LocationError::GeocodingUnavailable("down".to_string()).is_retryable());
        assert!(!LocationError::PlaceNotFound("Nowhere".to_string()).is_retryable());
    }
}
