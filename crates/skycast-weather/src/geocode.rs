//! Forward geocoding and IP-based auto-location.
//!
//! Uses Nominatim (OpenStreetMap) for place and postal-code lookups and
//! ipapi.co for IP geolocation - both free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::LocationError;
use crate::types::Coordinates;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const IP_LOOKUP_URL: &str = "https://ipapi.co";
const USER_AGENT: &str = "skycast/0.1.0 (https://github.com/skycast/skycast)";

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    // Nominatim serializes coordinates as strings
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
}

/// Resolves free text, postal codes and the caller's own IP to coordinates.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    ip_url: String,
}

impl Geocoder {
    pub fn new(timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LocationError::GeocodingUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: NOMINATIM_URL.to_string(),
            ip_url: IP_LOOKUP_URL.to_string(),
        })
    }

    #[cfg(test)]
    pub fn with_base_urls(timeout: Duration, base_url: &str, ip_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.to_string(),
            ip_url: ip_url.to_string(),
        }
    }

    /// Geocode free text (city, address, landmark), taking the best match.
    pub async fn search_place(&self, query: &str) -> Result<Coordinates, LocationError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1&addressdetails=1",
            self.base_url,
            urlencoding::encode(query),
        );
        self.first_match(&url, query).await
    }

    /// Geocode a US ZIP code.
    pub async fn search_postal_code(&self, code: &str) -> Result<Coordinates, LocationError> {
        let url = format!(
            "{}/search?postalcode={}&country=US&format=json&limit=1&addressdetails=1",
            self.base_url,
            urlencoding::encode(code),
        );
        self.first_match(&url, code).await
    }

    /// Detect the caller's location from their public IP.
    pub async fn detect_current(&self) -> Result<Coordinates, LocationError> {
        let url = format!("{}/json/", self.ip_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocationError::GeocodingUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::GeocodingUnavailable(format!(
                "IP lookup returned HTTP {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| LocationError::GeocodingUnavailable(format!("invalid response: {e}")))?;

        if body.error {
            return Err(LocationError::GeocodingUnavailable(
                body.reason.unwrap_or_else(|| "IP lookup failed".to_string()),
            ));
        }

        let (latitude, longitude) = match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(LocationError::GeocodingUnavailable(
                    "IP lookup response missing coordinates".to_string(),
                ))
            }
        };

        let name = match (body.city, body.country_name) {
            (Some(city), Some(country)) => Some(format!("{city}, {country}")),
            (Some(city), None) => Some(city),
            _ => None,
        };

        let coords = match name {
            Some(name) => Coordinates::named(latitude, longitude, name)?,
            None => Coordinates::new(latitude, longitude)?,
        };
        tracing::debug!(%coords, "detected current location");
        Ok(coords)
    }

    async fn first_match(&self, url: &str, query: &str) -> Result<Coordinates, LocationError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LocationError::GeocodingUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LocationError::GeocodingUnavailable(format!(
                "geocoder returned HTTP {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| LocationError::GeocodingUnavailable(format!("invalid response: {e}")))?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| LocationError::PlaceNotFound(query.to_string()))?;

        let latitude: f64 = place.lat.parse().map_err(|_| {
            LocationError::GeocodingUnavailable(format!("invalid latitude in response: {}", place.lat))
        })?;
        let longitude: f64 = place.lon.parse().map_err(|_| {
            LocationError::GeocodingUnavailable(format!(
                "invalid longitude in response: {}",
                place.lon
            ))
        })?;

        let name = display_label(place.address, place.display_name, query);
        let coords = Coordinates::named(latitude, longitude, name)?;
        tracing::debug!(%coords, query, "geocoded");
        Ok(coords)
    }
}

/// Build a "City, Country" label, falling back to the first parts of the
/// provider's display name, then to the query itself.
fn display_label(
    address: Option<NominatimAddress>,
    display_name: Option<String>,
    query: &str,
) -> String {
    if let Some(addr) = address {
        // Prefer city > town > village > municipality for the primary name
        let place = addr
            .city
            .or(addr.town)
            .or(addr.village)
            .or(addr.municipality)
            .or(addr.state);

        if let Some(place) = place {
            if let Some(country) = addr.country {
                return format!("{place}, {country}");
            }
            return place;
        }
    }

    match display_name {
        Some(full) => {
            let parts: Vec<&str> = full.split(", ").collect();
            if parts.len() >= 2 {
                parts[..2].join(", ")
            } else {
                full
            }
        }
        None => query.to_string(),
    }
}
