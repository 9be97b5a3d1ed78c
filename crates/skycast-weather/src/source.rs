//! Capability contract implemented by each weather provider.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::SourceError;
use crate::open_meteo::OpenMeteoSource;
use crate::types::{Coordinates, Units, WeatherReport};
use crate::wttr::WttrSource;

/// A weather data provider. Implementations own their response-shape
/// normalization into [`WeatherReport`]; fields a provider cannot supply
/// stay empty. Calls are never retried internally.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Stable identifier used for selection and cache keys.
    fn name(&self) -> &'static str;

    /// Current conditions at a location.
    async fn fetch_current(
        &self,
        location: &Coordinates,
        units: Units,
    ) -> Result<WeatherReport, SourceError>;

    /// Conditions summary for a specific date. Sources without a forecast
    /// capability surface that distinctly rather than failing generically.
    async fn fetch_forecast(
        &self,
        location: &Coordinates,
        date: NaiveDate,
        units: Units,
    ) -> Result<WeatherReport, SourceError> {
        let _ = (location, date, units);
        Err(SourceError::Unsupported {
            src: self.name(),
            operation: "forecast",
        })
    }
}

/// Name -> implementation table. Dispatch is by lookup; selection is
/// explicit and there is no automatic failover.
#[derive(Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Box<dyn WeatherSource>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in provider.
    pub fn with_defaults(timeout: Duration) -> Result<Self, SourceError> {
        let mut registry = Self::new();
        registry.register(Box::new(OpenMeteoSource::new(timeout)?));
        registry.register(Box::new(WttrSource::new(timeout)?));
        Ok(registry)
    }

    /// Add a provider, replacing any previous one with the same name.
    pub fn register(&mut self, source: Box<dyn WeatherSource>) {
        self.sources.insert(source.name().to_string(), source);
    }

    pub fn get(&self, name: &str) -> Option<&dyn WeatherSource> {
        self.sources.get(name).map(|source| source.as_ref())
    }

    /// Registered names, sorted for stable display.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
