//! Runtime configuration.
//!
//! Everything is optional and read from environment variables once at
//! startup. Values are passed explicitly to the components that need them.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::aqicn::{BrowserConfig, DEFAULT_WEBDRIVER_URL, ScrapeConfig};
use crate::cpcb::{DEFAULT_FEED_URL, FeedConfig};

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Error for an environment variable that is set but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key}={value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Complete service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Remote feed settings
    pub feed: FeedConfig,
    /// Serve the feed from this file instead of over HTTP
    pub feed_file: Option<PathBuf>,
    /// Browser session settings
    pub browser: BrowserConfig,
    /// Scrape flow timings
    pub scrape: ScrapeConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let bind_addr = env
            .parse::<SocketAddr>("AQI_BIND_ADDR", "expected host:port")?
            .unwrap_or_else(default_bind_addr);

        let feed_url = env
            .string("CPCB_FEED_URL")
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let feed = FeedConfig::new(feed_url)
            .with_timeout(env.parse("CPCB_TIMEOUT_SECS", "expected seconds")?.unwrap_or(20))
            .with_accept_invalid_certs(env.flag("CPCB_INSECURE_TLS")?.unwrap_or(false));

        let browser = BrowserConfig::new(
            env.string("WEBDRIVER_URL")
                .unwrap_or_else(|| DEFAULT_WEBDRIVER_URL.to_string()),
        )
        .with_headless(env.flag("BROWSER_HEADLESS")?.unwrap_or(true))
        .with_slow_mo(env.millis("BROWSER_SLOW_MO_MS")?.unwrap_or(Duration::ZERO))
        .with_keep_open(env.flag("BROWSER_KEEP_OPEN")?.unwrap_or(false));

        let mut scrape = ScrapeConfig::default();
        if let Some(delay) = env.millis("BROWSER_TYPE_DELAY_MS")? {
            scrape = scrape.with_typing_delay(delay);
        }

        Ok(Self {
            bind_addr,
            feed,
            feed_file: env.string("CPCB_FEED_FILE").map(PathBuf::from),
            browser,
            scrape,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            feed: FeedConfig::default(),
            feed_file: None,
            browser: BrowserConfig::default(),
            scrape: ScrapeConfig::default(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

/// Typed accessors over a variable lookup. Blank values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: std::str::FromStr>(
        &self,
        key: &'static str,
        reason: &'static str,
    ) -> Result<Option<T>, ConfigError> {
        self.string(key)
            .map(|value| {
                value.parse().map_err(|_| ConfigError {
                    key,
                    value: value.clone(),
                    reason,
                })
            })
            .transpose()
    }

    fn millis(&self, key: &'static str) -> Result<Option<Duration>, ConfigError> {
        Ok(self
            .parse::<u64>(key, "expected milliseconds")?
            .map(Duration::from_millis))
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.string(key) else {
            return Ok(None);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError {
                key,
                value,
                reason: "expected a boolean",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert!(config.browser.headless);
        assert_eq!(config.scrape.typing_delay, Duration::from_millis(15));
        assert_eq!(config.feed_file, None);
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("AQI_BIND_ADDR", "0.0.0.0:9000"),
            ("CPCB_FEED_URL", "http://feed.local/stations"),
            ("CPCB_FEED_FILE", "data/feed.json"),
            ("CPCB_INSECURE_TLS", "yes"),
            ("CPCB_TIMEOUT_SECS", "5"),
            ("WEBDRIVER_URL", "http://chrome:4444"),
            ("BROWSER_HEADLESS", "false"),
            ("BROWSER_SLOW_MO_MS", "250"),
            ("BROWSER_TYPE_DELAY_MS", "40"),
            ("BROWSER_KEEP_OPEN", "ON"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:9000");
        assert_eq!(config.feed.url, "http://feed.local/stations");
        assert_eq!(config.feed.timeout_secs, 5);
        assert!(config.feed.accept_invalid_certs);
        assert_eq!(config.feed_file, Some(PathBuf::from("data/feed.json")));
        assert_eq!(config.browser.webdriver_url, "http://chrome:4444");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.slow_mo, Duration::from_millis(250));
        assert!(config.browser.keep_open);
        assert_eq!(config.scrape.typing_delay, Duration::from_millis(40));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = config_from(&[("BROWSER_HEADLESS", "  "), ("WEBDRIVER_URL", "")]).unwrap();
        assert!(config.browser.headless);
        assert_eq!(config.browser.webdriver_url, DEFAULT_WEBDRIVER_URL);
    }

    #[test]
    fn invalid_boolean_is_an_error() {
        let err = config_from(&[("BROWSER_HEADLESS", "sometimes")]).unwrap_err();
        assert_eq!(err.key, "BROWSER_HEADLESS");
        assert_eq!(
            err.to_string(),
            "invalid BROWSER_HEADLESS=\"sometimes\": expected a boolean"
        );
    }

    #[test]
    fn invalid_number_is_an_error() {
        let err = config_from(&[("BROWSER_SLOW_MO_MS", "fast")]).unwrap_err();
        assert_eq!(err.key, "BROWSER_SLOW_MO_MS");

        let err = config_from(&[("AQI_BIND_ADDR", "localhost")]).unwrap_err();
        assert_eq!(err.key, "AQI_BIND_ADDR");
    }
}
