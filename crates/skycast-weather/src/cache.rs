//! File-backed weather cache with TTL expiry.
//!
//! One JSON file per fingerprint. Expired and unreadable entries are
//! treated as absent and removed on read; write failures degrade to a
//! skipped store. Caching is an optimization - nothing in here is allowed
//! to fail a query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::date::RequestedDate;
use crate::types::{Coordinates, Units, WeatherReport};

/// Deterministic fingerprint for a logical query.
///
/// Coordinates enter at fixed precision, so values differing only beyond
/// four decimals key identically.
pub fn cache_key(
    location: &Coordinates,
    date: &RequestedDate,
    source: &str,
    units: Units,
) -> String {
    let material = format!(
        "{}|{}|{}|{}",
        location.cache_fragment(),
        date.cache_component(),
        source,
        units.as_str(),
    );
    let digest = Sha256::digest(material.as_bytes());
    hex::encode(digest)
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    report: WeatherReport,
}

/// TTL-bounded store of weather reports under a cache directory.
#[derive(Debug, Clone)]
pub struct WeatherCache {
    cache_dir: PathBuf,
    ttl: Duration,
}

impl WeatherCache {
    pub fn new(cache_dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ttl,
        }
    }

    /// Fetch a fresh entry. Expired or unreadable entries are removed and
    /// reported as a miss.
    pub fn lookup(&self, key: &str) -> Option<WeatherReport> {
        let path = self.entry_path(key);
        let bytes = fs::read(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("discarding unreadable cache entry {}: {e}", path.display());
                remove_quietly(&path);
                return None;
            }
        };

        // Entries timestamped in the future count as expired too.
        let age = (Utc::now() - entry.fetched_at)
            .to_std()
            .unwrap_or(Duration::MAX);
        if age >= self.ttl {
            remove_quietly(&path);
            return None;
        }

        Some(entry.report)
    }

    /// Store a report, overwriting any entry under the same key.
    /// Failures are logged and swallowed.
    pub fn store(&self, key: &str, report: &WeatherReport) {
        let entry = CacheEntry {
            fetched_at: Utc::now(),
            report: report.clone(),
        };
        if let Err(e) = self.try_store(key, &entry) {
            tracing::warn!("skipping cache write for {key}: {e}");
        }
    }

    fn try_store(&self, key: &str, entry: &CacheEntry) -> anyhow::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let body = serde_json::to_vec_pretty(entry)?;
        fs::write(self.entry_path(key), body)?;
        Ok(())
    }

    /// Remove every entry. Returns the number of files removed.
    pub fn clear(&self) -> usize {
        self.remove_matching(|_| true)
    }

    /// Remove entries past their TTL. Unreadable files are removed as well.
    pub fn cleanup_expired(&self) -> usize {
        self.remove_matching(|path| match fs::read(path) {
            Ok(bytes) => match serde_json::from_slice::<CacheEntry>(&bytes) {
                Ok(entry) => {
                    let age = (Utc::now() - entry.fetched_at)
                        .to_std()
                        .unwrap_or(Duration::MAX);
                    age >= self.ttl
                }
                Err(_) => true,
            },
            Err(_) => true,
        })
    }

    fn remove_matching(&self, should_remove: impl Fn(&Path) -> bool) -> usize {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") && should_remove(&path) {
                if fs::remove_file(&path).is_ok() {
                    removed += 1;
                }
            }
        }
        removed
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{key}.json"))
    }
}

fn remove_quietly(path: &Path) {
    let _ = fs::remove_file(path);
}
