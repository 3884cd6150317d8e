//! Browser session and scrape error types.

use std::time::Duration;

use fantoccini::error::{CmdError, NewSessionError};

/// Errors from the remote browser session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The WebDriver server refused to create a session
    #[error("could not create session: {0}")]
    Start(#[from] NewSessionError),

    /// A WebDriver command failed
    #[error("browser command failed: {0}")]
    Command(#[from] CmdError),

    /// A wait ran out of time
    #[error("timed out after {timeout:?} waiting for {selector}")]
    Timeout { selector: String, timeout: Duration },

    /// No element matched a selector
    #[error("no element matches {selector}")]
    NoSuchElement { selector: String },
}

/// Errors from the scrape pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The search input never appeared
    #[error("search page did not load: {0}")]
    NavigationTimeout(#[source] SessionError),

    /// Typing the station name produced no results
    #[error("no search results for {query:?}: {source}")]
    NoSearchResults {
        query: String,
        #[source]
        source: SessionError,
    },

    /// The station page never showed any known content marker
    #[error("station content did not load: {0}")]
    ContentTimeout(#[source] SessionError),

    /// Any other session failure
    #[error("browser session failed: {0}")]
    Session(#[from] SessionError),

    /// A station URL was blank
    #[error("invalid station URL {0:?}")]
    InvalidUrl(String),

    /// Retries exhausted without a recorded cause
    #[error("failed to load station data")]
    LoadFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SessionError::Timeout {
            selector: "#searchResults a".into(),
            timeout: Duration::from_secs(60),
        };
        assert_eq!(err.to_string(), "timed out after 60s waiting for #searchResults a");

        let err = ScrapeError::NoSearchResults {
            query: "ITO".into(),
            source: err,
        };
        assert!(err.to_string().starts_with("no search results for \"ITO\""));

        assert_eq!(ScrapeError::LoadFailed.to_string(), "failed to load station data");

        let err = SessionError::from(CmdError::NotJson("<html>".into()));
        assert!(err.to_string().starts_with("browser command failed"));
    }
}
