//! skycast command-line entrypoint.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use skycast_core::Config;
use skycast_weather::{
    LocationError, LocationResolver, RequestedDate, SourceError, SourceRegistry, Units,
    WeatherCache, WeatherError, WeatherPipeline, WeatherQuery,
};

mod format;

use format::OutputFormat;

const EXAMPLES: &str = "\
Examples:
  skycast                                   Current location (auto-detect)
  skycast \"New York\"                        City name
  skycast 10001                             ZIP code
  skycast \"40.7128,-74.0060\"                Decimal coordinates
  skycast --lat 40.7128 --lon -74.0060      Explicit coordinates
  skycast London --format visual --units imperial
  skycast Rome --date tomorrow              Tomorrow's forecast
  skycast Berlin --date 07252025            Specific date (MMDDYYYY)
";

#[derive(Parser, Debug)]
#[command(name = "skycast", version, about = "Command-line weather tool", after_help = EXAMPLES)]
struct Cli {
    /// Location: city, ZIP code, coordinates, or empty for auto-detect
    location: Option<String>,

    /// Latitude (use with --lon)
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude (use with --lat)
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Date for weather data: MMDDYYYY, today, tomorrow
    #[arg(long)]
    date: Option<String>,

    /// Output format
    #[arg(long, short, value_enum)]
    format: Option<FormatArg>,

    /// Unit system
    #[arg(long, short, value_enum)]
    units: Option<UnitsArg>,

    /// Weather data source
    #[arg(long, short)]
    source: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Disable cache usage
    #[arg(long)]
    no_cache: bool,

    /// Clear cache and exit
    #[arg(long)]
    clear_cache: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for Units {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Metric => Units::Metric,
            UnitsArg::Imperial => Units::Imperial,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Simple,
    Visual,
    Raw,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Simple => OutputFormat::Simple,
            FormatArg::Visual => OutputFormat::Visual,
            FormatArg::Raw => OutputFormat::Raw,
        }
    }
}

/// Everything `run` can fail with, mapped onto the process exit codes.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Weather data error: {0}")]
    Source(#[from] SourceError),

    #[error("Error: {0}")]
    Weather(WeatherError),

    #[error("Error: {0:#}")]
    Other(#[from] anyhow::Error),
}

impl From<WeatherError> for CliError {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::Location(e) => CliError::Location(e),
            WeatherError::Source(e) => CliError::Source(e),
            other => CliError::Weather(other),
        }
    }
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Location(_) => 2,
            CliError::Source(_) => 3,
            CliError::Weather(_) | CliError::Other(_) => 1,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli).await {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let config = Config::load_validated(cli.config.as_deref())?;

    let cache_dir = Config::cache_dir();
    let cache_ttl = Duration::from_secs(config.cache_duration_secs);

    if cli.clear_cache {
        let removed = WeatherCache::new(&cache_dir, cache_ttl).clear();
        return Ok(format!("Cache cleared ({removed} entries)."));
    }

    // Flags beat the config file, which beats built-in defaults.
    let units = cli
        .units
        .map(Units::from)
        .or_else(|| Units::from_name(&config.units))
        .unwrap_or_default();
    let output_format = cli
        .format
        .map(OutputFormat::from)
        .or_else(|| OutputFormat::from_name(&config.format))
        .unwrap_or_default();
    let source = cli.source.unwrap_or_else(|| config.source.clone());
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(config.timeout_secs));

    let date = RequestedDate::parse(cli.date.as_deref())?;

    tracing::debug!(
        units = units.as_str(),
        source = %source,
        timeout_secs = timeout.as_secs(),
        "resolved settings"
    );

    let pipeline = WeatherPipeline::new(
        LocationResolver::new(timeout)?,
        WeatherCache::new(cache_dir, cache_ttl),
        SourceRegistry::with_defaults(timeout)?,
    );

    let query = WeatherQuery {
        location: cli.location,
        latitude: cli.lat,
        longitude: cli.lon,
        date,
        source,
        units,
        use_cache: !cli.no_cache,
    };

    let report = pipeline.get_weather(&query).await?;
    Ok(format::render(output_format, &report))
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
