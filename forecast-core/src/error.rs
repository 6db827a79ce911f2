use thiserror::Error;

/// Longest body excerpt carried by [`FetchError::Http`], in characters.
pub const EXCERPT_MAX_CHARS: usize = 50;

const UNKNOWN_NETWORK_ERROR: &str = "An unknown network error occurred.";

/// Why a forecast request did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The provider answered with a non-success status.
    #[error("HTTP error {status}: {excerpt}")]
    Http { status: u16, excerpt: String },

    /// The request never completed, or the body could not be decoded.
    #[error("{0}")]
    Transport(String),
}

impl FetchError {
    pub fn http(status: u16, body: &str) -> Self {
        FetchError::Http { status, excerpt: excerpt(body) }
    }

    /// Wraps an underlying error message, substituting a generic one when empty.
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            FetchError::Transport(UNKNOWN_NETWORK_ERROR.to_string())
        } else {
            FetchError::Transport(message)
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::transport(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::transport(format!("Malformed forecast response: {err}"))
    }
}

/// Rejected location input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("Location must not be empty")]
    Empty,
}

fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(EXCERPT_MAX_CHARS).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_message_carries_status_and_body() {
        let err = FetchError::http(404, "city not found");
        let msg = err.to_string();

        assert!(msg.contains("404"));
        assert!(msg.contains("city not found"));
        assert!(!msg.ends_with("..."));
    }

    #[test]
    fn long_bodies_are_cut_at_fifty_chars() {
        let body = "é".repeat(80);
        let FetchError::Http { excerpt, .. } = FetchError::http(500, &body) else {
            panic!("expected Http variant");
        };

        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + 3);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn blank_transport_message_falls_back() {
        assert_eq!(FetchError::transport("  ").to_string(), UNKNOWN_NETWORK_ERROR);
        assert_eq!(FetchError::transport("dns failure").to_string(), "dns failure");
    }
}
