//! Retrieval errors. Parsing never produces these; only fetching a page does.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Failed to create HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },

    #[error("Network error: could not reach {url}: {source}")]
    Network { url: String, source: reqwest::Error },

    /// Non-success status. `context` names the operation, e.g. "work 123".
    #[error("Failed to fetch {context}. Status: {status}")]
    HttpStatus {
        status: u16,
        url: String,
        context: String,
    },

    #[error("Failed to read response body: {source}")]
    BodyRead { source: reqwest::Error },
}

impl ScraperError {
    /// HTTP status of a failed retrieval, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScraperError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the archive answered 404 (unknown work, chapter, series or user).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_names_operation() {
        let err = ScraperError::HttpStatus {
            status: 404,
            url: "https://archiveofourown.org/works/000000".to_string(),
            context: "work 000000".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to fetch work 000000. Status: 404");
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn other_errors_carry_no_status() {
        let err = ScraperError::InvalidUrl {
            input: "x".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
