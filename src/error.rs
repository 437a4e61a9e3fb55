use std::path::PathBuf;

/// Failures the pipeline recovers from locally, plus the few that can
/// happen while setting it up.
#[derive(Debug, thiserror::Error)]
pub enum LemmacloudError {
    #[error("search for {query:?} failed: {reason}")]
    Discovery { query: String, reason: String },

    #[error("could not extract text from {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("could not load morphology dictionary {path:?}: {reason}")]
    Dictionary { path: PathBuf, reason: String },

    #[error("result count must be between {min} and {max}, got {got}")]
    InvalidResultCount { got: u32, min: u32, max: u32 },
}

impl LemmacloudError {
    pub fn discovery(query: &str, reason: impl std::fmt::Display) -> Self {
        Self::Discovery {
            query: query.to_string(),
            reason: format!("{reason:#}"),
        }
    }

    pub fn extraction(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Extraction {
            url: url.to_string(),
            reason: format!("{reason:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LemmacloudError::extraction("https://example.com", "timed out");
        assert_eq!(
            err.to_string(),
            "could not extract text from https://example.com: timed out"
        );

        let err = LemmacloudError::InvalidResultCount {
            got: 51,
            min: 1,
            max: 50,
        };
        assert!(err.to_string().contains("got 51"));
    }

    #[test]
    fn test_discovery_keeps_anyhow_context_chain() {
        let source = anyhow::anyhow!("connection refused").context("search request failed");
        let err = LemmacloudError::discovery("туры", source);
        assert_eq!(
            err.to_string(),
            "search for \"туры\" failed: search request failed: connection refused"
        );
    }
}
