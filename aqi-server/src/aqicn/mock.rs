//! Scripted browser session for testing without a browser.
//!
//! Each attempt of the scrape flow is described by an [`AttemptScript`]:
//! where (if anywhere) it fails, what the first search result links to and
//! what HTML the station page serves. An attempt begins whenever the session
//! is sent to the search page. Every call is recorded for later inspection.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fantoccini::error::CmdError;
use tokio::sync::Mutex;

use super::error::SessionError;
use super::extract::CONTENT_MARKERS;
use super::orchestrator::{SEARCH_INPUT, SEARCH_RESULT_LINK, ScrapeConfig};
use super::session::{BrowserSession, SessionLauncher};

/// Where a scripted attempt breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Loading the search page errors out
    Navigate,
    /// Loading the search page times out
    PageLoad,
    /// The search input never appears
    SearchInput,
    /// No search results appear
    Results,
    /// The station page never shows content
    Content,
}

/// Behaviour of one attempt.
#[derive(Debug, Clone, Default)]
pub struct AttemptScript {
    pub fail_at: Option<FailurePoint>,
    pub href: Option<String>,
    pub html: String,
}

impl AttemptScript {
    /// An attempt that reaches the station page and serves `html`.
    pub fn success(html: impl Into<String>) -> Self {
        Self {
            fail_at: None,
            href: None,
            html: html.into(),
        }
    }

    /// An attempt that fails at `point`.
    pub fn failing_at(point: FailurePoint) -> Self {
        Self {
            fail_at: Some(point),
            ..Self::default()
        }
    }

    /// Give the first search result an `href`.
    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

/// A call made against a [`ScriptedSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Navigate(String),
    WaitFor(String),
    Clear(String),
    Type(String, String),
    ReadAttribute(String, String),
    Click(String),
    CurrentUrl,
    Content,
    Reset,
    Close,
}

#[derive(Debug, Default)]
struct State {
    /// Index into the scripts; `None` before the first search navigation
    attempt: Option<usize>,
    calls: Vec<SessionCall>,
    url: String,
    typing_delay: Option<Duration>,
}

/// Browser session that replays [`AttemptScript`]s.
#[derive(Debug)]
pub struct ScriptedSession {
    attempts: Vec<AttemptScript>,
    search_url: String,
    current_url: Option<String>,
    fail_reset: bool,
    state: Mutex<State>,
}

impl ScriptedSession {
    /// Create a session that plays `attempts` in order. Attempts beyond
    /// the end of the list repeat the last script.
    pub fn new(attempts: Vec<AttemptScript>) -> Self {
        Self {
            attempts,
            search_url: ScrapeConfig::default().search_url(),
            current_url: None,
            fail_reset: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Treat navigations to `url` as the start of an attempt.
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Report `url` from `current_url` regardless of navigation.
    pub fn with_current_url(mut self, url: impl Into<String>) -> Self {
        self.current_url = Some(url.into());
        self
    }

    /// Make `reset_to_blank` fail.
    pub fn with_failing_reset(mut self) -> Self {
        self.fail_reset = true;
        self
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<SessionCall> {
        self.state.lock().await.calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub async fn count(&self, pred: impl Fn(&SessionCall) -> bool) -> usize {
        self.state.lock().await.calls.iter().filter(|c| pred(c)).count()
    }

    /// Delay passed to the most recent `type_into`.
    pub async fn last_typing_delay(&self) -> Option<Duration> {
        self.state.lock().await.typing_delay
    }

    fn script(&self, attempt: Option<usize>) -> AttemptScript {
        let index = attempt.unwrap_or(0);
        self.attempts
            .get(index)
            .or_else(|| self.attempts.last())
            .cloned()
            .unwrap_or_default()
    }

    async fn record(&self, call: SessionCall) -> AttemptScript {
        let mut state = self.state.lock().await;
        state.calls.push(call);
        self.script(state.attempt)
    }
}

fn browser_error(message: &str) -> SessionError {
    SessionError::Command(CmdError::NotJson(message.to_string()))
}

fn timeout(selector: &str, timeout: Duration) -> SessionError {
    SessionError::Timeout {
        selector: selector.to_string(),
        timeout,
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&self, url: &str, timeout_after: Duration) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        state.calls.push(SessionCall::Navigate(url.to_string()));
        if url == self.search_url {
            state.attempt = Some(state.attempt.map_or(0, |n| n + 1));
            if self.script(state.attempt).fail_at == Some(FailurePoint::Navigate) {
                return Err(browser_error("net::ERR_CONNECTION_RESET"));
            }
            if self.script(state.attempt).fail_at == Some(FailurePoint::PageLoad) {
                return Err(timeout(url, timeout_after));
            }
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn wait_for_selector(
        &self,
        selector: &str,
        wait: Duration,
    ) -> Result<(), SessionError> {
        let script = self.record(SessionCall::WaitFor(selector.to_string())).await;
        let failing = match script.fail_at {
            Some(FailurePoint::SearchInput) => selector == SEARCH_INPUT,
            Some(FailurePoint::Results) => selector == SEARCH_RESULT_LINK,
            Some(FailurePoint::Content) => selector == CONTENT_MARKERS,
            _ => false,
        };
        if failing {
            return Err(timeout(selector, wait));
        }
        Ok(())
    }

    async fn clear(&self, selector: &str) -> Result<(), SessionError> {
        self.record(SessionCall::Clear(selector.to_string())).await;
        Ok(())
    }

    async fn type_into(
        &self,
        selector: &str,
        text: &str,
        delay: Duration,
    ) -> Result<(), SessionError> {
        self.record(SessionCall::Type(selector.to_string(), text.to_string()))
            .await;
        self.state.lock().await.typing_delay = Some(delay);
        Ok(())
    }

    async fn read_attribute(
        &self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let script = self
            .record(SessionCall::ReadAttribute(
                selector.to_string(),
                name.to_string(),
            ))
            .await;
        Ok(if name == "href" { script.href } else { None })
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        self.record(SessionCall::Click(selector.to_string())).await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        self.record(SessionCall::CurrentUrl).await;
        match &self.current_url {
            Some(url) => Ok(url.clone()),
            None => Ok(self.state.lock().await.url.clone()),
        }
    }

    async fn content(&self) -> Result<String, SessionError> {
        Ok(self.record(SessionCall::Content).await.html)
    }

    async fn reset_to_blank(&self) -> Result<(), SessionError> {
        self.record(SessionCall::Reset).await;
        if self.fail_reset {
            return Err(browser_error("tab crashed"));
        }
        self.state.lock().await.url = "about:blank".to_string();
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.record(SessionCall::Close).await;
        Ok(())
    }
}

/// Launcher that always hands out the same [`ScriptedSession`].
#[derive(Debug, Clone)]
pub struct ScriptedLauncher {
    session: Arc<ScriptedSession>,
    launches: Arc<AtomicUsize>,
    fail_launch: bool,
}

impl ScriptedLauncher {
    pub fn new(session: ScriptedSession) -> Self {
        Self {
            session: Arc::new(session),
            launches: Arc::new(AtomicUsize::new(0)),
            fail_launch: false,
        }
    }

    /// A launcher whose sessions never start.
    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(ScriptedSession::new(Vec::new()))
        }
    }

    /// The shared session, for inspecting recorded calls.
    pub fn session(&self) -> &ScriptedSession {
        &self.session
    }

    /// Number of launches so far.
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, SessionError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(browser_error("Chrome failed to start"));
        }
        Ok(Box::new(Arc::clone(&self.session)))
    }
}
