//! Location resolution: explicit overrides, coordinate syntax, geocoding.

use std::time::Duration;

use crate::error::LocationError;
use crate::geocode::Geocoder;
use crate::parse::parse_coordinates;
use crate::types::Coordinates;

/// Normalizes every supported location form into validated [`Coordinates`].
#[derive(Debug, Clone)]
pub struct LocationResolver {
    geocoder: Geocoder,
}

impl LocationResolver {
    pub fn new(timeout: Duration) -> Result<Self, LocationError> {
        Ok(Self {
            geocoder: Geocoder::new(timeout)?,
        })
    }

    pub fn with_geocoder(geocoder: Geocoder) -> Self {
        Self { geocoder }
    }

    /// Resolve a location. Precedence, first match wins:
    ///
    /// 1. Both explicit overrides: validate and return; nothing is parsed
    ///    or geocoded. One without the other is an error.
    /// 2. No input at all: IP-based auto-detection.
    /// 3. Coordinate syntax (decimal pair or DMS); malformed coordinates
    ///    fail hard rather than being re-interpreted as place names.
    /// 4. US ZIP shape: postal-code geocoding.
    /// 5. Anything else: free-text geocoding.
    pub async fn resolve(
        &self,
        raw: Option<&str>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Coordinates, LocationError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => return Coordinates::new(lat, lon),
            (Some(_), None) | (None, Some(_)) => return Err(LocationError::IncompleteOverride),
            (None, None) => {}
        }

        let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw,
            None => return self.geocoder.detect_current().await,
        };

        if let Some(coords) = parse_coordinates(raw)? {
            return Ok(coords);
        }

        if is_us_zip(raw) {
            return self.geocoder.search_postal_code(raw).await;
        }

        self.geocoder.search_place(raw).await
    }
}

/// US ZIP code shape: 5 digits, optionally followed by -4 digits.
fn is_us_zip(input: &str) -> bool {
    let bytes = input.as_bytes();
    match bytes.len() {
        5 => bytes.iter().all(u8::is_ascii_digit),
        10 => {
            bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[5] == b'-'
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}
