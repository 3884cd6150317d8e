//! AQICN station scraper.
//!
//! AQICN has no public lookup by CPCB station name, so readings are taken
//! from its website: search the map page for the station, open the first
//! result and read whichever page layout comes back. The site is an SPA and
//! flaky under load, so the flow retries with a clean page.
//!
//! The browser itself sits behind [`BrowserSession`]; [`WebDriverLauncher`]
//! provides one over the W3C WebDriver protocol.

mod error;
mod extract;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
mod orchestrator;
mod reading;
mod session;
mod url;
mod webdriver;

pub use error::{ScrapeError, SessionError};
pub use extract::{CONTENT_MARKERS, extract_reading};
pub use orchestrator::{
    DEFAULT_ORIGIN, SEARCH_INPUT, SEARCH_PATH, SEARCH_RESULT_LINK, ScrapeConfig,
    ScrapeOrchestrator, ScrapeStage,
};
pub use reading::{ScrapeReading, SourceLayout};
pub use session::{BrowserSession, SessionLauncher};
pub use url::resolve_station_url;
pub use webdriver::{BrowserConfig, DEFAULT_WEBDRIVER_URL, WebDriverLauncher, WebDriverSession};
