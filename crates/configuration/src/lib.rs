use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnalyticsSettings, Config, DashboardSettings, IndicatorSettings, LoggingSettings,
    MarketDataSettings, ServerSettings,
};

/// The file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Command-line flags that influence configuration loading.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// Path to a TOML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: std::path::PathBuf,
}

/// Loads the application configuration from `config.toml` in the working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new(DEFAULT_CONFIG_FILE))
}

/// Loads the configuration from `path`, layered under `MARKETDECK__*` environment variables.
///
/// A missing file is not an error: every section has defaults. The result is
/// validated before it is returned.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        // e.g. MARKETDECK__SERVER__PORT=8080
        .add_source(
            config::Environment::with_prefix("MARKETDECK")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("dashboard.default_tickers")
                .with_list_parse_key("indicators.sma_periods")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Interval, Period};
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.indicators.sma_periods, vec![20, 50, 200]);
        assert_eq!(config.dashboard.default_period, Period::OneMonth);
        assert_eq!(config.dashboard.default_tickers, vec!["AAPL", "MSFT", "GOOGL"]);
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn file_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[analytics]
log_path = "/tmp/events.json"

[dashboard]
default_interval = "1wk"
refresh_interval_secs = 120

[indicators]
rsi_period = 21
"#
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.analytics.log_path, std::path::PathBuf::from("/tmp/events.json"));
        assert_eq!(config.dashboard.default_interval, Interval::OneWeek);
        assert_eq!(config.dashboard.refresh_interval_secs, 120);
        assert_eq!(config.indicators.rsi_period, 21);
        // Untouched fields keep their defaults.
        assert_eq!(config.indicators.atr_period, 14);
    }

    #[test]
    fn rejects_inverted_macd_spans() {
        let mut config = Config::default();
        config.indicators.ema_fast = 30;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn rejects_refresh_interval_out_of_range() {
        let mut config = Config::default();
        config.dashboard.refresh_interval_secs = 5;
        assert!(config.validate().is_err());

        config.dashboard.auto_refresh = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_windows() {
        let mut config = Config::default();
        config.indicators.sma_periods = vec![20, 0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_session_idle_time() {
        let mut config = Config::default();
        assert_eq!(config.server.session_idle_secs, 1800);
        config.server.session_idle_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }
}
