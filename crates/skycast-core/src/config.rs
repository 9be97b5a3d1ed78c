use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub const VALID_UNITS: &[&str] = &["metric", "imperial"];
pub const VALID_FORMATS: &[&str] = &["simple", "visual", "raw"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unit system for display and provider queries
    pub units: String,

    /// Output format
    pub format: String,

    /// Weather data source name; the source registry decides whether it exists
    pub source: String,

    /// Cache entry lifetime in seconds (0 disables caching in practice)
    pub cache_duration_secs: u64,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            units: "metric".to_string(),
            format: "simple".to_string(),
            source: "open-meteo".to_string(),
            cache_duration_secs: 300,
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from the given path, or the default location.
    /// A missing file yields the defaults; a malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

        Ok(config)
    }

    /// Load configuration and validate it.
    ///
    /// Warnings are logged; validation errors abort the load.
    pub fn load_validated(path: Option<&Path>) -> Result<Self> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file {}", config_path.display()))?;

        Ok(())
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !VALID_UNITS.contains(&self.units.as_str()) {
            result.add_error(
                "units",
                format!("Invalid units '{}'. Must be one of {:?}", self.units, VALID_UNITS),
            );
        }

        if !VALID_FORMATS.contains(&self.format.as_str()) {
            result.add_error(
                "format",
                format!(
                    "Invalid format '{}'. Must be one of {:?}",
                    self.format, VALID_FORMATS
                ),
            );
        }

        if self.source.trim().is_empty() {
            result.add_error("source", "Source name must not be empty");
        }

        if self.timeout_secs == 0 {
            result.add_error("timeout_secs", "Timeout must be greater than 0");
        } else if self.timeout_secs > 300 {
            result.add_warning("timeout_secs", "Timeout is unusually large (>300s)");
        }

        if self.cache_duration_secs == 0 {
            result.add_warning("cache_duration_secs", "Caching disabled (0 seconds)");
        } else if self.cache_duration_secs > 86_400 {
            result.add_warning(
                "cache_duration_secs",
                "Cache entries live longer than 24 hours",
            );
        }

        result
    }

    /// Directory for cached weather responses.
    ///
    /// `SKYCAST_CACHE_DIR` overrides the platform cache directory.
    pub fn cache_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os("SKYCAST_CACHE_DIR") {
            return PathBuf::from(dir);
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast")
    }

    /// Path of the configuration file.
    fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
