//! Full-viewport frame around an externally hosted page.

use crate::errors::{Error, Result};

/// An open embed; closing it is the only action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedFrame {
    src: String,
}

impl EmbedFrame {
    /// Opens `src`, which must be an http(s) URL.
    pub fn open(src: &str) -> Result<Self> {
        let src = src.trim();
        let has_host = src
            .strip_prefix("https://")
            .or_else(|| src.strip_prefix("http://"))
            .is_some_and(|rest| !rest.is_empty());
        if !has_host {
            return Err(Error::validation(format!("Cannot embed '{src}'")));
        }
        Ok(Self {
            src: src.to_string(),
        })
    }

    /// Page shown in the frame.
    #[must_use]
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Closes the frame.
    pub fn close(self) {
        tracing::debug!("Closed embed of {}", self.src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_accepts_web_urls_only() {
        assert_eq!(
            EmbedFrame::open(" https://example.org/helper ").map(|f| f.src().to_string()).ok(),
            Some("https://example.org/helper".to_string())
        );
        assert!(EmbedFrame::open("http://").is_err());
        assert!(EmbedFrame::open("file:///etc/passwd").is_err());
    }
}
