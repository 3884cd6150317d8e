//! CPCB feed error types.

/// Errors that can occur when loading the station feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed endpoint returned an error status
    #[error("feed error {status}: {message}")]
    Api { status: u16, message: String },

    /// Body was not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// Reading a local feed file failed
    #[error("feed file error: {message}")]
    Io { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::Api {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "feed error 503: Service Unavailable");

        let err = FeedError::Json {
            message: "expected value at line 1 column 1".into(),
        };
        assert!(err.to_string().starts_with("JSON parse error"));
    }
}
