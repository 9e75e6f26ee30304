//! Layered settings: defaults, then an optional `lobx.toml`, then `LOBX_*`
//! environment variables (`__` separates nested keys, e.g. `LOBX_KRAKEN__PAIR`).

use std::env;
use std::time::Duration;

use config::{Config, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use crate::engine::types::Venue;
use crate::engine::walker::PriceMethod;

/// What to do when some venues fail to deliver a book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Any venue failure aborts the aggregation.
    Strict,
    /// Price from whichever venues answered and flag the quote as partial.
    #[default]
    Resilient,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub venues: Vec<Venue>,
    pub timeout_ms: u64,
    pub policy: FailurePolicy,
    pub method: PriceMethod,
    /// Offered at the interactive prompt.
    pub default_quantity: Decimal,
    pub coinbase: CoinbaseConfig,
    pub kraken: KrakenConfig,
    pub gemini: GeminiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            venues: vec![Venue::Coinbase, Venue::Kraken, Venue::Gemini],
            timeout_ms: 5_000,
            policy: FailurePolicy::default(),
            method: PriceMethod::default(),
            default_quantity: dec!(10),
            coinbase: CoinbaseConfig::default(),
            kraken: KrakenConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = env::var("LOBX_CONFIG").unwrap_or_else(|_| "lobx".to_string());
        Self::from_sources(&path, Environment::with_prefix("LOBX"))
    }

    fn from_sources(path: &str, environment: Environment) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                environment
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("venues"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoinbaseConfig {
    pub base_url: String,
    pub product: String,
}

impl Default for CoinbaseConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.exchange.coinbase.com".into(),
            product: "BTC-USD".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KrakenConfig {
    pub base_url: String,
    pub pair: String,
    /// Key Kraken files the book under in `result`.
    pub result_key: String,
    pub depth: u32,
}

impl Default for KrakenConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kraken.com".into(),
            pair: "XBTUSD".into(),
            result_key: "XXBTZUSD".into(),
            depth: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub symbol: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gemini.com".into(),
            symbol: "BTCUSD".into(),
        }
    }
}
