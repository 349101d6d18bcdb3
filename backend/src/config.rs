use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use adapters::finnhub::DEFAULT_WS_URL;
use engine::Thresholds;

use crate::error::ConfigError;

/// Tracked equities.
pub const EQUITIES: &[&str] = &[
    "TSLA", "AAPL", "GOOGL", "AMZN", "META", "NVDA", "NFLX", "INTC", "ORCL", "CSCO", "SAP", "ADBE",
    "PYPL", "UBER", "LYFT", "SNAP", "SHOP", "SPOT", "ROKU", "IBM", "ABNB", "DASH", "JPM", "MSFT",
];

/// Tracked crypto pairs, in Finnhub's `EXCHANGE:PAIR` form.
pub const CRYPTO: &[&str] = &[
    "BINANCE:BTCUSDT",
    "BINANCE:ETHUSDT",
    "BINANCE:XRPUSDT",
    "BINANCE:LTCUSDT",
    "BINANCE:BCHUSDT",
    "BINANCE:BNBUSDT",
    "BINANCE:DOGEUSDT",
    "BINANCE:SOLUSDT",
];

#[derive(Clone)]
pub struct AppConfig {
    /// Chat webhook alerts are posted to. Secret.
    pub webhook_url: String,
    /// Finnhub API key. Secret.
    pub finnhub_api_key: String,
    pub finnhub_ws_url: String,

    pub equities: Vec<String>,
    pub crypto: Vec<String>,

    // =========================
    // Detection
    // =========================
    /// Percentage move (absolute) that triggers an alert, per asset class.
    pub thresholds: Thresholds,

    // =========================
    // Feed / pipeline
    // =========================
    /// A connection with no traffic for this long is considered dead
    /// and is re-established.
    pub feed_read_timeout: Duration,

    /// Capacity of the ingestor -> engine channel.
    pub tick_queue_capacity: usize,

    /// Capacity of the engine -> notifier channel. When full, new alerts are
    /// dropped rather than stalling tick processing.
    pub alert_queue_capacity: usize,

    /// How often pipeline counters are logged.
    pub stats_interval: Duration,
}

// Secrets stay out of logs.
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("webhook_url", &"<redacted>")
            .field("finnhub_api_key", &"<redacted>")
            .field("finnhub_ws_url", &self.finnhub_ws_url)
            .field("equities", &self.equities.len())
            .field("crypto", &self.crypto.len())
            .field("thresholds", &self.thresholds)
            .field("feed_read_timeout", &self.feed_read_timeout)
            .field("tick_queue_capacity", &self.tick_queue_capacity)
            .field("alert_queue_capacity", &self.alert_queue_capacity)
            .field("stats_interval", &self.stats_interval)
            .finish()
    }
}

/// Loads `.env` from the working directory (or a parent) if one exists.
pub fn load_dotenv() {
    let _ = dotenv::dotenv();
}

/// `APP_ENV=production` switches logging to JSON. Read before the rest of
/// the configuration so that config errors are logged in the right format.
pub fn is_production() -> bool {
    production_in(|name| std::env::var(name).ok())
}

fn production_in<F>(lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup("APP_ENV").is_some_and(|v| v.trim() == "production")
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        let webhook_url = required("DISCORD_WEBHOOK_URL")?;
        let finnhub_api_key = required("FINNHUB_API_KEY")?;

        let finnhub_ws_url = lookup("FINNHUB_WS_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_WS_URL.to_string());

        let thresholds = Thresholds {
            equity_pct: threshold(&lookup, "EQUITY_THRESHOLD_PCT", 1.0)?,
            crypto_pct: threshold(&lookup, "CRYPTO_THRESHOLD_PCT", 0.5)?,
        };

        let feed_read_timeout =
            Duration::from_secs(positive(&lookup, "FEED_READ_TIMEOUT_SECS", 60u64)?);
        let tick_queue_capacity = positive(&lookup, "TICK_QUEUE_CAPACITY", 4096usize)?;
        let alert_queue_capacity = positive(&lookup, "ALERT_QUEUE_CAPACITY", 1024usize)?;
        let stats_interval = Duration::from_secs(positive(&lookup, "STATS_INTERVAL_SECS", 60u64)?);

        Ok(Self {
            webhook_url,
            finnhub_api_key,
            finnhub_ws_url,
            equities: EQUITIES.iter().map(|s| s.to_string()).collect(),
            crypto: CRYPTO.iter().map(|s| s.to_string()).collect(),
            thresholds,
            feed_read_timeout,
            tick_queue_capacity,
            alert_queue_capacity,
            stats_interval,
        })
    }
}

fn parsed<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn positive<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default + fmt::Display,
    T::Err: fmt::Display,
{
    let v = parsed(lookup, var, default)?;
    if v <= T::default() {
        return Err(ConfigError::Invalid {
            var,
            value: v.to_string(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(v)
}

fn threshold<F>(lookup: &F, var: &'static str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let v = positive(lookup, var, default)?;
    if !v.is_finite() {
        return Err(ConfigError::Invalid {
            var,
            value: v.to_string(),
            reason: "must be finite".into(),
        });
    }
    Ok(v)
}
