//! The remote browser session the scraper drives.
//!
//! The orchestrator only needs a handful of primitives from a browser. They
//! are collected here so the pipeline can be exercised against a scripted
//! session in tests and a WebDriver-backed one in production.
//!
//! Element arguments are CSS selectors and always address the *first*
//! matching element.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::error::SessionError;

/// One interactive browser tab.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Load `url`, waiting at most `timeout` for the document to be ready.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError>;

    /// Wait until an element matches `selector`.
    ///
    /// Fails with [`SessionError::Timeout`] once `timeout` has elapsed.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration)
    -> Result<(), SessionError>;

    /// Clear the value of an input.
    async fn clear(&self, selector: &str) -> Result<(), SessionError>;

    /// Type `text` into an input one character at a time, pausing `delay`
    /// between keystrokes.
    async fn type_into(&self, selector: &str, text: &str, delay: Duration)
    -> Result<(), SessionError>;

    /// Read an attribute. `Ok(None)` if the element lacks it.
    async fn read_attribute(&self, selector: &str, name: &str)
    -> Result<Option<String>, SessionError>;

    /// Click an element.
    async fn click(&self, selector: &str) -> Result<(), SessionError>;

    /// URL currently displayed.
    async fn current_url(&self) -> Result<String, SessionError>;

    /// Serialized DOM of the current page.
    async fn content(&self) -> Result<String, SessionError>;

    /// Return to a blank page so the next attempt starts clean.
    async fn reset_to_blank(&self) -> Result<(), SessionError>;

    /// Tear the session down.
    async fn close(&self) -> Result<(), SessionError>;
}

/// Starts a fresh browser session per request.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, SessionError>;
}

#[async_trait]
impl<T: BrowserSession + ?Sized> BrowserSession for Arc<T> {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        (**self).navigate(url, timeout).await
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), SessionError> {
        (**self).wait_for_selector(selector, timeout).await
    }

    async fn clear(&self, selector: &str) -> Result<(), SessionError> {
        (**self).clear(selector).await
    }

    async fn type_into(
        &self,
        selector: &str,
        text: &str,
        delay: Duration,
    ) -> Result<(), SessionError> {
        (**self).type_into(selector, text, delay).await
    }

    async fn read_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        (**self).read_attribute(selector, name).await
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        (**self).click(selector).await
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        (**self).current_url().await
    }

    async fn content(&self) -> Result<String, SessionError> {
        (**self).content().await
    }

    async fn reset_to_blank(&self) -> Result<(), SessionError> {
        (**self).reset_to_blank().await
    }

    async fn close(&self) -> Result<(), SessionError> {
        (**self).close().await
    }
}
