//! Browser session backed by a WebDriver server.
//!
//! Sessions are created through `fantoccini` against a WebDriver endpoint
//! such as chromedriver. Each launch creates a new browser session; closing
//! it ends the session (unless configured to keep it open for debugging).

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::{Capabilities, TimeoutConfiguration};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use super::error::SessionError;
use super::session::{BrowserSession, SessionLauncher};

/// Default chromedriver endpoint.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// How often `wait_for_selector` re-checks the page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chrome flags needed to run inside containers.
const CHROME_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
];

/// Configuration for WebDriver-backed sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserConfig {
    /// WebDriver server URL
    pub webdriver_url: String,
    /// Run the browser without a window
    pub headless: bool,
    /// Pause after every action (debugging aid)
    pub slow_mo: Duration,
    /// Leave the browser session running after a request
    pub keep_open: bool,
}

impl BrowserConfig {
    /// Create a config for the given WebDriver server.
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless: true,
            slow_mo: Duration::ZERO,
            keep_open: false,
        }
    }

    /// Toggle headless mode.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the pause after each action.
    pub fn with_slow_mo(mut self, slow_mo: Duration) -> Self {
        self.slow_mo = slow_mo;
        self
    }

    /// Keep sessions open after use.
    pub fn with_keep_open(mut self, keep_open: bool) -> Self {
        self.keep_open = keep_open;
        self
    }

    /// Capabilities sent when creating a session.
    fn capabilities(&self) -> Capabilities {
        let mut args: Vec<&str> = CHROME_ARGS.to_vec();
        if self.headless {
            args.push("--headless=new");
        }

        let mut caps = Capabilities::new();
        caps.insert("browserName".into(), json!("chrome"));
        // Return once the DOM is parsed, don't wait for every asset
        caps.insert("pageLoadStrategy".into(), json!("eager"));
        caps.insert("goog:chromeOptions".into(), json!({ "args": args }));
        caps
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WEBDRIVER_URL)
    }
}

/// Creates WebDriver sessions.
#[derive(Debug, Clone, Default)]
pub struct WebDriverLauncher {
    config: BrowserConfig,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    #[instrument(skip(self), fields(webdriver = %self.config.webdriver_url))]
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, SessionError> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.config.capabilities());
        let client = builder.connect(&self.config.webdriver_url).await?;
        debug!("started browser session");

        Ok(Box::new(WebDriverSession {
            client,
            slow_mo: self.config.slow_mo,
            keep_open: self.config.keep_open,
        }))
    }
}

/// One WebDriver browser session.
pub struct WebDriverSession {
    client: Client,
    slow_mo: Duration,
    keep_open: bool,
}

impl WebDriverSession {
    /// First element matching `selector`.
    async fn element(&self, selector: &str) -> Result<Element, SessionError> {
        self.client
            .find(Locator::Css(selector))
            .await
            .map_err(|e| missing_element(e, selector))
    }

    async fn pace(&self) {
        if !self.slow_mo.is_zero() {
            sleep(self.slow_mo).await;
        }
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        self.client
            .update_timeouts(TimeoutConfiguration::new(None, Some(timeout), None))
            .await?;

        let result = self.client.goto(url).await;
        self.pace().await;

        match result {
            Err(CmdError::Standard(e)) if e.error == ErrorStatus::Timeout => {
                Err(SessionError::Timeout {
                    selector: url.to_string(),
                    timeout,
                })
            }
            other => Ok(other?),
        }
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        let found = self
            .client
            .wait()
            .at_most(timeout)
            .every(POLL_INTERVAL)
            .for_element(Locator::Css(selector))
            .await;

        match found {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(SessionError::Timeout {
                selector: selector.to_string(),
                timeout,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn clear(&self, selector: &str) -> Result<(), SessionError> {
        self.element(selector).await?.clear().await?;
        self.pace().await;
        Ok(())
    }

    async fn type_into(
        &self,
        selector: &str,
        text: &str,
        delay: Duration,
    ) -> Result<(), SessionError> {
        let input = self.element(selector).await?;
        if delay.is_zero() {
            input.send_keys(text).await?;
        } else {
            // Suggestions are keystroke-driven
            let mut key = [0u8; 4];
            for ch in text.chars() {
                input.send_keys(ch.encode_utf8(&mut key)).await?;
                sleep(delay).await;
            }
        }
        self.pace().await;
        Ok(())
    }

    async fn read_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        Ok(self.element(selector).await?.attr(name).await?)
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        self.element(selector).await?.click().await?;
        self.pace().await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn content(&self) -> Result<String, SessionError> {
        Ok(self.client.source().await?)
    }

    async fn reset_to_blank(&self) -> Result<(), SessionError> {
        Ok(self.client.goto("about:blank").await?)
    }

    async fn close(&self) -> Result<(), SessionError> {
        if self.keep_open {
            // Dropping the last client would otherwise end the session
            self.client.persist().await?;
            info!("keeping browser session open");
            return Ok(());
        }
        self.client.clone().close().await?;
        Ok(())
    }
}

/// Map a lookup miss to [`SessionError::NoSuchElement`].
fn missing_element(err: CmdError, selector: &str) -> SessionError {
    match err {
        ref e if e.is_no_such_element() => SessionError::NoSuchElement {
            selector: selector.to_string(),
        },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = BrowserConfig::default();
        assert_eq!(config.webdriver_url, DEFAULT_WEBDRIVER_URL);
        assert!(config.headless);
        assert_eq!(config.slow_mo, Duration::ZERO);
        assert!(!config.keep_open);
    }

    #[test]
    fn config_builder() {
        let config = BrowserConfig::new("http://selenium:4444")
            .with_headless(false)
            .with_slow_mo(Duration::from_millis(250))
            .with_keep_open(true);

        assert_eq!(config.webdriver_url, "http://selenium:4444");
        assert!(!config.headless);
        assert_eq!(config.slow_mo, Duration::from_millis(250));
        assert!(config.keep_open);
    }

    #[test]
    fn headless_flag_in_capabilities() {
        let caps = BrowserConfig::default().capabilities();
        assert_eq!(caps["browserName"], json!("chrome"));
        assert_eq!(caps["pageLoadStrategy"], json!("eager"));
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(args.contains(&json!("--headless=new")));
        assert!(args.contains(&json!("--no-sandbox")));

        let caps = BrowserConfig::default().with_headless(false).capabilities();
        let args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!args.contains(&json!("--headless=new")));
    }

    #[test]
    fn other_errors_are_not_misses() {
        let err = missing_element(CmdError::NotJson("<html>".into()), "#x");
        assert!(matches!(err, SessionError::Command(_)));
    }
}
