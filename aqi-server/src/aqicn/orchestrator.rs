//! Retry-bounded scrape of one station on AQICN.
//!
//! A single attempt walks a fixed sequence of stages:
//!
//! ```text
//! Init → NavigatedToSearch → QueryTyped → ResultsVisible
//!      → TargetSelected → ContentReady → (reading)
//! ```
//!
//! Any stage may fail the attempt. Failed attempts reset the session to a
//! blank page and start again from `Init` until the attempt budget is spent,
//! at which point the last failure is returned.

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::error::{ScrapeError, SessionError};
use super::extract::{CONTENT_MARKERS, extract_reading};
use super::reading::{ScrapeReading, SourceLayout};
use super::session::BrowserSession;
use super::url::resolve_station_url;

/// Default AQICN origin.
pub const DEFAULT_ORIGIN: &str = "https://aqicn.org";

/// Path of the map page hosting the station search box.
pub const SEARCH_PATH: &str = "/map";

/// Full-page station search input.
pub const SEARCH_INPUT: &str = "#full-page-search-input";

/// Links in the search suggestion list.
pub const SEARCH_RESULT_LINK: &str = "#searchResults a";

/// Configuration for the scrape pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeConfig {
    /// Site origin, without trailing slash
    pub origin: String,
    /// Pause between typed characters (suggestions are keystroke-driven)
    pub typing_delay: Duration,
    /// Pause after typing for suggestions to populate
    pub settle_delay: Duration,
    /// Wait for the search input
    pub navigation_timeout: Duration,
    /// Wait for search results
    pub results_timeout: Duration,
    /// Wait for station content
    pub content_timeout: Duration,
    /// Total attempts, including the first
    pub max_attempts: u32,
}

impl ScrapeConfig {
    /// Create a config with default timings against `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            typing_delay: Duration::from_millis(15),
            settle_delay: Duration::from_millis(600),
            navigation_timeout: Duration::from_secs(60),
            results_timeout: Duration::from_secs(60),
            content_timeout: Duration::from_secs(60),
            max_attempts: 2,
        }
    }

    /// Set the per-character typing delay.
    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    /// Set the post-typing settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set all three wait timeouts at once.
    pub fn with_timeouts(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self.results_timeout = timeout;
        self.content_timeout = timeout;
        self
    }

    /// Set the attempt budget.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// URL of the search page.
    pub fn search_url(&self) -> String {
        format!("{}{}", self.origin.trim_end_matches('/'), SEARCH_PATH)
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

/// Position within a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeStage {
    Init,
    NavigatedToSearch,
    QueryTyped,
    ResultsVisible,
    /// `url` is the resolved result link, if the result had one
    TargetSelected { url: Option<String> },
    ContentReady { url: Option<String> },
}

/// What an attempt is after.
#[derive(Clone, Copy)]
enum Target<'a> {
    /// Search the map for a station name
    Search(&'a str),
    /// Open a known station page
    Page(&'a str),
}

/// Outcome of advancing one stage.
enum Transition {
    Next(ScrapeStage),
    Extracted(ScrapeReading),
}

/// Drives one browser session through the AQICN search flow.
///
/// Owned by a single request; holds no state between runs.
pub struct ScrapeOrchestrator<'a> {
    session: &'a dyn BrowserSession,
    config: &'a ScrapeConfig,
}

impl<'a> ScrapeOrchestrator<'a> {
    pub fn new(session: &'a dyn BrowserSession, config: &'a ScrapeConfig) -> Self {
        Self { session, config }
    }

    /// Search for `station_name` and read its current readings.
    ///
    /// Makes up to `max_attempts` attempts, resetting the session between
    /// them. A failed reset is ignored. Returns the last attempt's error once
    /// the budget is spent.
    #[instrument(skip(self), fields(max_attempts = self.config.max_attempts))]
    pub async fn run(&self, station_name: &str) -> Result<ScrapeReading, ScrapeError> {
        self.retrying(Target::Search(station_name)).await
    }

    /// Read a station page whose URL is already known, skipping the search.
    ///
    /// `url` may be absolute or relative to the configured origin. Retries
    /// like [`run`](Self::run).
    #[instrument(skip(self), fields(max_attempts = self.config.max_attempts))]
    pub async fn read_url(&self, url: &str) -> Result<ScrapeReading, ScrapeError> {
        let url = resolve_station_url(&self.config.origin, Some(url))
            .ok_or_else(|| ScrapeError::InvalidUrl(url.to_string()))?;
        self.retrying(Target::Page(&url)).await
    }

    async fn retrying(&self, target: Target<'_>) -> Result<ScrapeReading, ScrapeError> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts {
            match self.attempt(target).await {
                Ok(reading) => {
                    info!(attempt, layout = reading.source_layout.as_str(), "scraped station");
                    return Ok(reading);
                }
                Err(e) => {
                    warn!(attempt, error = %e, "scrape attempt failed");
                    last_error = Some(e);
                }
            }

            if attempt < self.config.max_attempts {
                if let Err(e) = self.session.reset_to_blank().await {
                    debug!(error = %e, "session reset failed, retrying anyway");
                }
            }
        }

        Err(last_error.unwrap_or(ScrapeError::LoadFailed))
    }

    /// One pass to a reading. Searches start at `Init`; known pages are
    /// opened directly and join the flow at `TargetSelected`.
    async fn attempt(&self, target: Target<'_>) -> Result<ScrapeReading, ScrapeError> {
        let (mut stage, query) = match target {
            Target::Search(name) => (ScrapeStage::Init, name),
            Target::Page(url) => {
                self.session
                    .navigate(url, self.config.navigation_timeout)
                    .await
                    .map_err(|e| on_timeout(e, ScrapeError::ContentTimeout))?;
                let url = Some(url.to_string());
                (ScrapeStage::TargetSelected { url }, "")
            }
        };

        loop {
            debug!(?stage, "advancing");
            match self.advance(stage, query).await? {
                Transition::Next(next) => stage = next,
                Transition::Extracted(reading) => return Ok(reading),
            }
        }
    }

    async fn advance(
        &self,
        stage: ScrapeStage,
        station_name: &str,
    ) -> Result<Transition, ScrapeError> {
        let session = self.session;
        let config = self.config;

        let next = match stage {
            ScrapeStage::Init => {
                session
                    .navigate(&config.search_url(), config.navigation_timeout)
                    .await
                    .map_err(|e| on_timeout(e, ScrapeError::NavigationTimeout))?;
                session
                    .wait_for_selector(SEARCH_INPUT, config.navigation_timeout)
                    .await
                    .map_err(|e| on_timeout(e, ScrapeError::NavigationTimeout))?;
                ScrapeStage::NavigatedToSearch
            }

            ScrapeStage::NavigatedToSearch => {
                session.clear(SEARCH_INPUT).await?;
                session
                    .type_into(SEARCH_INPUT, station_name, config.typing_delay)
                    .await?;
                tokio::time::sleep(config.settle_delay).await;
                ScrapeStage::QueryTyped
            }

            ScrapeStage::QueryTyped => {
                session
                    .wait_for_selector(SEARCH_RESULT_LINK, config.results_timeout)
                    .await
                    .map_err(|e| {
                        on_timeout(e, |source| ScrapeError::NoSearchResults {
                            query: station_name.to_string(),
                            source,
                        })
                    })?;
                ScrapeStage::ResultsVisible
            }

            ScrapeStage::ResultsVisible => {
                // Follow the href directly; click only when it is unusable
                let href = session.read_attribute(SEARCH_RESULT_LINK, "href").await?;
                let url = resolve_station_url(&config.origin, href.as_deref());
                match &url {
                    Some(target) => session.navigate(target, config.navigation_timeout).await?,
                    None => session.click(SEARCH_RESULT_LINK).await?,
                }
                ScrapeStage::TargetSelected { url }
            }

            ScrapeStage::TargetSelected { url } => {
                session
                    .wait_for_selector(CONTENT_MARKERS, config.content_timeout)
                    .await
                    .map_err(|e| on_timeout(e, ScrapeError::ContentTimeout))?;
                ScrapeStage::ContentReady { url }
            }

            ScrapeStage::ContentReady { url } => {
                let url = match url {
                    Some(url) => Some(url),
                    None => session
                        .current_url()
                        .await
                        .inspect_err(|e| debug!(error = %e, "could not read current URL"))
                        .ok(),
                };
                let html = session.content().await?;
                let reading = extract_reading(&html, url);
                if reading.source_layout == SourceLayout::None {
                    warn!(url = ?reading.url, "station page matched no known layout");
                }
                return Ok(Transition::Extracted(reading));
            }
        };

        Ok(Transition::Next(next))
    }
}

/// Classify a wait failure: timeouts become `wrap(..)`, anything else is a
/// plain session error.
fn on_timeout(err: SessionError, wrap: impl FnOnce(SessionError) -> ScrapeError) -> ScrapeError {
    match err {
        timeout @ SessionError::Timeout { .. } => wrap(timeout),
        other => ScrapeError::Session(other),
    }
}
