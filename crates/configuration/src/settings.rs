use core_types::{Interval, Period};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so the application runs with no
/// configuration file at all.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub analytics: AnalyticsSettings,
    pub market_data: MarketDataSettings,
    pub dashboard: DashboardSettings,
    pub indicators: IndicatorSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Analytics sessions idle for longer than this are dropped.
    pub session_idle_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            session_idle_secs: 1800,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// The JSON file holding the analytics event log.
    pub log_path: PathBuf,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("analytics_data.json"),
        }
    }
}

/// Connection parameters for the market-data HTTP source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 10,
            user_agent: "Mozilla/5.0 (compatible; marketdeck/0.1)".to_string(),
        }
    }
}

/// User-facing dashboard defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub default_tickers: Vec<String>,
    pub default_period: Period,
    pub default_interval: Interval,
    pub auto_refresh: bool,
    /// Seconds between refreshes of the browser view.
    pub refresh_interval_secs: u64,
    pub theme: String,
    pub show_technical_indicators: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            default_tickers: vec!["AAPL".to_string(), "MSFT".to_string(), "GOOGL".to_string()],
            default_period: Period::OneMonth,
            default_interval: Interval::OneDay,
            auto_refresh: true,
            refresh_interval_secs: 60,
            theme: "dark".to_string(),
            show_technical_indicators: true,
        }
    }
}

/// Window lengths for the indicator engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub sma_periods: Vec<usize>,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    /// Number of standard deviations between the middle and outer bands.
    pub bollinger_k: f64,
    pub rsi_period: usize,
    pub atr_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            sma_periods: vec![20, 50, 200],
            ema_fast: 12,
            ema_slow: 26,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_k: 2.0,
            rsi_period: 14,
            atr_period: 14,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        let windows = [
            ("ema_fast", ind.ema_fast),
            ("ema_slow", ind.ema_slow),
            ("macd_signal", ind.macd_signal),
            ("bollinger_window", ind.bollinger_window),
            ("rsi_period", ind.rsi_period),
            ("atr_period", ind.atr_period),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "indicators.{name} must be greater than zero"
                )));
            }
        }
        if ind.sma_periods.iter().any(|&p| p == 0) {
            return Err(ConfigError::ValidationError(
                "indicators.sma_periods must not contain zero".to_string(),
            ));
        }
        if ind.ema_fast >= ind.ema_slow {
            return Err(ConfigError::ValidationError(format!(
                "indicators.ema_fast ({}) must be shorter than indicators.ema_slow ({})",
                ind.ema_fast, ind.ema_slow
            )));
        }
        if !(ind.bollinger_k >= 0.0) {
            return Err(ConfigError::ValidationError(
                "indicators.bollinger_k must be a non-negative number".to_string(),
            ));
        }

        if self.server.session_idle_secs == 0 {
            return Err(ConfigError::ValidationError(
                "server.session_idle_secs must be greater than zero".to_string(),
            ));
        }

        let dash = &self.dashboard;
        if dash.auto_refresh && !(60..=300).contains(&dash.refresh_interval_secs) {
            return Err(ConfigError::ValidationError(format!(
                "dashboard.refresh_interval_secs must be between 60 and 300, got {}",
                dash.refresh_interval_secs
            )));
        }
        Ok(())
    }
}
