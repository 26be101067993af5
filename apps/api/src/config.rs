use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::billing::{PollSettings, Price, PriceList};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub payment_api_url: String,
    pub payment_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub export_price: Price,
    pub min_charge: Price,
    pub poll_interval: Duration,
    pub confirmation_delay: Duration,
    pub settlement_timeout: Option<Duration>,
    pub http_timeout: Duration,
    pub export_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            payment_api_url: require_env("PAYMENT_API_URL")?,
            payment_api_key: std::env::var("PAYMENT_API_KEY").ok().filter(|k| !k.is_empty()),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            export_price: Price::from_decimal(
                parse_env("EXPORT_PRICE", 10.00).context("EXPORT_PRICE must be a decimal amount")?,
            ),
            min_charge: Price::from_decimal(
                parse_env("MIN_CHARGE", 5.00).context("MIN_CHARGE must be a decimal amount")?,
            ),
            poll_interval: Duration::from_millis(
                parse_env("SETTLEMENT_POLL_INTERVAL_MS", 5000)
                    .context("SETTLEMENT_POLL_INTERVAL_MS must be milliseconds")?,
            ),
            confirmation_delay: Duration::from_millis(
                parse_env("CONFIRMATION_DELAY_MS", 1500)
                    .context("CONFIRMATION_DELAY_MS must be milliseconds")?,
            ),
            settlement_timeout: match std::env::var("SETTLEMENT_TIMEOUT_SECS") {
                Ok(v) if !v.trim().is_empty() => Some(Duration::from_secs(
                    v.trim()
                        .parse()
                        .context("SETTLEMENT_TIMEOUT_SECS must be whole seconds")?,
                )),
                _ => None,
            },
            http_timeout: Duration::from_secs(
                parse_env("HTTP_TIMEOUT_SECS", 30).context("HTTP_TIMEOUT_SECS must be whole seconds")?,
            ),
            export_dir: PathBuf::from(
                std::env::var("EXPORT_DIR").unwrap_or_else(|_| "exports".to_string()),
            ),
        };

        anyhow::ensure!(
            !config.poll_interval.is_zero(),
            "SETTLEMENT_POLL_INTERVAL_MS must be greater than zero"
        );
        Ok(config)
    }

    pub fn prices(&self) -> PriceList {
        PriceList {
            base: self.export_price,
            minimum: self.min_charge,
        }
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: self.poll_interval,
            confirmation_delay: self.confirmation_delay,
            timeout: self.settlement_timeout,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => Ok(raw.trim().parse::<T>()?),
        _ => Ok(default),
    }
}
