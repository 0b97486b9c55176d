// Failure types for platform access and team aggregation.

use thiserror::Error;

/// A failed call to one upstream endpoint.
///
/// Carries rendered messages rather than the underlying client error so the
/// value can be cloned into views and compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connect, DNS, timeout, or body read failure.
    #[error("network error fetching {endpoint}: {message}")]
    Transport { endpoint: String, message: String },

    /// Upstream answered with a non-success status.
    #[error("{message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    /// Upstream said the credentials may not read this resource.
    #[error("{message}")]
    Permission { endpoint: String, message: String },

    /// The body was not the shape we expected.
    #[error("unexpected payload from {endpoint}: {message}")]
    Payload { endpoint: String, message: String },
}

impl FetchError {
    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Permission { endpoint, .. }
            | FetchError::Payload { endpoint, .. } => endpoint,
        }
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, FetchError::Permission { .. })
    }
}

/// Neither the scoreboard nor the user list produced a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Unable to fetch team data from CTFd API: {users}")]
    TeamsUnavailable {
        /// Why the scoreboard was skipped; `None` when it was merely empty.
        scoreboard: Option<FetchError>,
        users: FetchError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_message_only() {
        let err = FetchError::Status {
            endpoint: "/users".into(),
            status: 502,
            message: "HTTP error! status: 502".into(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 502");
        assert_eq!(err.endpoint(), "/users");
        assert!(!err.is_permission());
    }

    #[test]
    fn board_error_mentions_user_failure() {
        let err = BoardError::TeamsUnavailable {
            scoreboard: None,
            users: FetchError::Transport {
                endpoint: "/users".into(),
                message: "connection refused".into(),
            },
        };
        let text = err.to_string();
        assert!(text.starts_with("Unable to fetch team data"));
        assert!(text.contains("connection refused"));
    }
}
