//! Weather query pipeline for skycast
//!
//! Resolves heterogeneous location input (place names, ZIP codes, decimal
//! and DMS coordinates, explicit overrides, IP auto-detection) into
//! validated coordinates, fetches weather data from a selectable provider,
//! and caches responses under deterministic fingerprints with TTL expiry.

pub mod cache;
pub mod date;
pub mod error;
pub mod geocode;
pub mod location;
pub mod open_meteo;
pub mod parse;
pub mod pipeline;
pub mod source;
pub mod types;
pub mod wttr;

pub use cache::{cache_key, WeatherCache};
pub use date::RequestedDate;
pub use error::{Axis, LocationError, SourceError, WeatherError};
pub use location::LocationResolver;
pub use pipeline::{WeatherPipeline, WeatherQuery};
pub use source::{SourceRegistry, WeatherSource};
pub use types::{Coordinates, CurrentConditions, DailySummary, UnitLabels, Units, WeatherReport};
