//! Top-level orchestration: resolve location, consult the cache, fetch,
//! store, return.

use crate::cache::{cache_key, WeatherCache};
use crate::date::RequestedDate;
use crate::error::WeatherError;
use crate::location::LocationResolver;
use crate::source::SourceRegistry;
use crate::types::{Units, WeatherReport};

/// One weather query, fully parameterized. Defaults come from the caller's
/// configuration layer; the pipeline does no file I/O of its own.
#[derive(Debug, Clone)]
pub struct WeatherQuery {
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: RequestedDate,
    pub source: String,
    pub units: Units,
    pub use_cache: bool,
}

/// The single entry point callers see. Holds its collaborators explicitly;
/// there is no global state.
pub struct WeatherPipeline {
    resolver: LocationResolver,
    cache: WeatherCache,
    sources: SourceRegistry,
}

impl WeatherPipeline {
    pub fn new(resolver: LocationResolver, cache: WeatherCache, sources: SourceRegistry) -> Self {
        Self {
            resolver,
            cache,
            sources,
        }
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Run one query to completion: either a full report or one typed error.
    ///
    /// The source name is checked before anything touches the network, and
    /// a failed fetch never leaves a partial cache entry behind.
    pub async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let source = self
            .sources
            .get(&query.source)
            .ok_or_else(|| WeatherError::UnknownSource(query.source.clone()))?;

        let location = self
            .resolver
            .resolve(query.location.as_deref(), query.latitude, query.longitude)
            .await?;
        tracing::debug!(%location, "resolved location");

        let key = cache_key(&location, &query.date, source.name(), query.units);

        if query.use_cache {
            if let Some(mut report) = self.cache.lookup(&key) {
                tracing::debug!(key = %key, "cache hit");
                report.cache_hit = true;
                return Ok(report);
            }
        }

        let report = match query.date {
            RequestedDate::Today => source.fetch_current(&location, query.units).await?,
            RequestedDate::OnDate(date) => {
                source.fetch_forecast(&location, date, query.units).await?
            }
        };

        if query.use_cache {
            self.cache.store(&key, &report);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::error::SourceError;
    use crate::geocode::Geocoder;
    use crate::source::WeatherSource;
    use crate::types::{Coordinates, CurrentConditions, UnitLabels};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Canned source that counts how often it is hit.
    struct CountingSource {
        fetches: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WeatherSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_current(
            &self,
            location: &Coordinates,
            units: Units,
        ) -> Result<WeatherReport, SourceError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(WeatherReport {
                location: location.clone(),
                current: CurrentConditions {
                    temperature: Some(21.5),
                    ..CurrentConditions::default()
                },
                daily: None,
                units: UnitLabels::for_units(units),
                source: self.name().to_string(),
                timestamp: Utc::now(),
                forecast_date: None,
                cache_hit: false,
            })
        }
    }

    /// Source that always fails; nothing it returns may reach the cache.
    struct FailingSource;

    #[async_trait]
    impl WeatherSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_current(
            &self,
            _location: &Coordinates,
            _units: Units,
        ) -> Result<WeatherReport, SourceError> {
            Err(SourceError::Unavailable {
                src: self.name(),
                reason: "down for the test".to_string(),
            })
        }
    }

    fn offline_resolver() -> LocationResolver {
        LocationResolver::with_geocoder(Geocoder::with_base_urls(
            Duration::from_millis(200),
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        ))
    }

    fn pipeline_with(
        cache_dir: &std::path::Path,
        ttl: Duration,
        source: Box<dyn WeatherSource>,
    ) -> WeatherPipeline {
        let mut sources = SourceRegistry::new();
        sources.register(source);
        WeatherPipeline::new(
            offline_resolver(),
            WeatherCache::new(cache_dir, ttl),
            sources,
        )
    }

    fn query(source: &str, use_cache: bool) -> WeatherQuery {
        WeatherQuery {
            location: Some("40.7128,-74.0060".to_string()),
            latitude: None,
            longitude: None,
            date: RequestedDate::Today,
            source: source.to_string(),
            units: Units::Metric,
            use_cache,
        }
    }

    #[tokio::test]
    async fn test_unknown_source_fails_before_any_network() {
        // Resolver and geocoder point at a closed port; reaching them would
        // error differently, so UnknownSource proves the early check.
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            Duration::from_secs(60),
            Box::new(FailingSource),
        );

        let mut q = query("bogus", true);
        q.location = Some("New York".to_string());
        let err = pipeline.get_weather(&q).await.unwrap_err();
        assert!(matches!(err, WeatherError::UnknownSource(ref name) if name == "bogus"));
    }

    #[tokio::test]
    async fn test_cache_idempotence() {
        let dir = tempfile::tempdir().unwrap();
        let fetches = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(
            dir.path(),
            Duration::from_secs(60),
            Box::new(CountingSource {
                fetches: Arc::clone(&fetches),
            }),
        );

        let q = query("counting", true);
        let first = pipeline.get_weather(&q).await.unwrap();
        assert!(!first.cache_hit);

        let second = pipeline.get_weather(&q).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.current.temperature, first.current.temperature);
        assert_eq!(second.source, first.source);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_forces_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let fetches = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(
            dir.path(),
            Duration::from_secs(0),
            Box::new(CountingSource {
                fetches: Arc::clone(&fetches),
            }),
        );

        let q = query("counting", true);
        assert!(!pipeline.get_weather(&q).await.unwrap().cache_hit);
        assert!(!pipeline.get_weather(&q).await.unwrap().cache_hit);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_cache_mode_bypasses_lookup_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let fetches = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(
            dir.path(),
            Duration::from_secs(60),
            Box::new(CountingSource {
                fetches: Arc::clone(&fetches),
            }),
        );

        let q = query("counting", false);
        assert!(!pipeline.get_weather(&q).await.unwrap().cache_hit);
        assert!(!pipeline.get_weather(&q).await.unwrap().cache_hit);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        // Nothing was written: a later cached query still fetches.
        let cached_q = query("counting", true);
        assert!(!pipeline.get_weather(&cached_q).await.unwrap().cache_hit);
        assert_eq!(fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_fetch_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            Duration::from_secs(60),
            Box::new(FailingSource),
        );

        let q = query("failing", true);
        let err = pipeline.get_weather(&q).await.unwrap_err();
        assert!(matches!(err, WeatherError::Source(SourceError::Unavailable { .. })));

        // The cache directory holds no entry files.
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .map(|rd| rd.flatten().collect())
            .unwrap_or_default();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_explicit_coordinates_with_invalid_latitude() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline_with(
            dir.path(),
            Duration::from_secs(60),
            Box::new(FailingSource),
        );

        let mut q = query("failing", true);
        q.location = None;
        q.latitude = Some(91.0);
        q.longitude = Some(0.0);
        let err = pipeline.get_weather(&q).await.unwrap_err();
        assert!(err.to_string().contains("latitude"));
        assert!(err.to_string().contains("91"));
    }

    #[tokio::test]
    async fn test_forecast_dispatch_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let fetches = Arc::new(AtomicUsize::new(0));
        let pipeline = pipeline_with(
            dir.path(),
            Duration::from_secs(60),
            Box::new(CountingSource { fetches }),
        );

        let mut q = query("counting", true);
        q.date = RequestedDate::OnDate(chrono::NaiveDate::from_ymd_opt(2025, 8, 9).unwrap());
        let err = pipeline.get_weather(&q).await.unwrap_err();
        assert!(matches!(
            err,
            WeatherError::Source(SourceError::Unsupported { .. })
        ));
    }
}
