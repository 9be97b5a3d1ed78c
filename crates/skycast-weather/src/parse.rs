//! Parsing of raw coordinate input: decimal pairs and DMS notation.

use crate::error::LocationError;
use crate::types::Coordinates;

/// Try to read `raw` as coordinate syntax.
///
/// `Ok(None)` means the input is not coordinate syntax at all and should be
/// geocoded instead. `Err` means the input committed to coordinate syntax
/// (a decimal pair or DMS markers) but is malformed or out of range — that
/// is a hard failure, never re-interpreted as a place name.
pub fn parse_coordinates(raw: &str) -> Result<Option<Coordinates>, LocationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Degree/minute/second markers commit the input to DMS.
    if trimmed.contains('°') || trimmed.contains('\'') || trimmed.contains('"') {
        return parse_dms(trimmed).map(Some);
    }

    match split_decimal_pair(trimmed) {
        Some((latitude, longitude)) => Coordinates::new(latitude, longitude).map(Some),
        None => Ok(None),
    }
}

/// Split "lat,lon" or "lat lon" into two numbers. Anything else — including
/// a single number or non-numeric parts — is not a decimal pair.
fn split_decimal_pair(input: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = if input.contains(',') {
        input.split(',').map(str::trim).collect()
    } else {
        input.split_whitespace().collect()
    };

    if parts.len() != 2 {
        return None;
    }

    let latitude: f64 = parts[0].parse().ok()?;
    let longitude: f64 = parts[1].parse().ok()?;
    Some((latitude, longitude))
}

struct DmsReading {
    degrees: f64,
    minutes: f64,
    seconds: f64,
    hemisphere: char,
}

impl DmsReading {
    fn decimal(&self) -> f64 {
        let value = self.degrees + self.minutes / 60.0 + self.seconds / 3600.0;
        if matches!(self.hemisphere, 'S' | 'W') {
            -value
        } else {
            value
        }
    }
}

/// Parse a DMS pair like `40°42'46.0"N 74°00'21.6"W`.
fn parse_dms(input: &str) -> Result<Coordinates, LocationError> {
    // Whitespace and axis separators carry no information here.
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != ';')
        .collect();

    let mut readings = Vec::new();
    let mut rest = compact.as_str();
    while !rest.is_empty() {
        let (reading, remainder) =
            parse_dms_axis(rest).ok_or_else(|| LocationError::Syntax(input.to_string()))?;
        readings.push(reading);
        rest = remainder;
    }

    if readings.len() != 2 {
        return Err(LocationError::Syntax(input.to_string()));
    }

    let latitude = readings
        .iter()
        .find(|r| matches!(r.hemisphere, 'N' | 'S'))
        .ok_or_else(|| LocationError::Syntax(input.to_string()))?;
    let longitude = readings
        .iter()
        .find(|r| matches!(r.hemisphere, 'E' | 'W'))
        .ok_or_else(|| LocationError::Syntax(input.to_string()))?;

    Coordinates::new(latitude.decimal(), longitude.decimal())
}

/// Read one axis: degrees, optional minutes, optional seconds, hemisphere.
fn parse_dms_axis(input: &str) -> Option<(DmsReading, &str)> {
    let (degrees, after_degrees) = take_number(input)?;
    let mut rest = after_degrees.strip_prefix('°')?;

    let mut minutes = 0.0;
    let mut seconds = 0.0;
    if let Some((value, after_value)) = take_number(rest) {
        if let Some(after_mark) = after_value.strip_prefix('\'') {
            minutes = value;
            rest = after_mark;
            if let Some((sec, after_sec)) = take_number(rest) {
                seconds = sec;
                rest = after_sec.strip_prefix('"')?;
            }
        } else if let Some(after_mark) = after_value.strip_prefix('"') {
            seconds = value;
            rest = after_mark;
        } else {
            return None;
        }
    }

    let hemisphere = rest.chars().next()?;
    if !matches!(hemisphere, 'N' | 'S' | 'E' | 'W') {
        return None;
    }

    Some((
        DmsReading {
            degrees,
            minutes,
            seconds,
            hemisphere,
        },
        &rest[1..],
    ))
}

/// Consume a leading unsigned decimal number.
fn take_number(input: &str) -> Option<(f64, &str)> {
    let end = input
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    let value: f64 = input[..end].parse().ok()?;
    Some((value, &input[end..]))
}
