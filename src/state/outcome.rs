/// Request outcome definitions used for crawl statistics
use crate::FetchError;
use std::fmt;

/// How a request left the crawl session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestOutcome {
    // ===== Success States =====
    /// Page was fetched and handed to its parser (or only to the rule engine)
    Processed,

    /// Asset was fetched and written to the sink
    Stored,

    // ===== Skip States =====
    /// Normalized URL was already enqueued or dispatched this session
    Duplicate,

    /// Host is outside the allowed domains
    Offsite,

    // ===== Error States =====
    /// HTTP 404 or 410
    DeadLink,

    /// Connection could not be established
    Unreachable,

    /// Fetch exceeded the per-request timeout
    TimedOut,

    /// Any other fetch failure (HTTP error status, body read error, ...)
    Failed,

    /// Asset was fetched but the sink rejected it
    StorageFailed,
}

impl RequestOutcome {
    /// Every outcome, in reporting order
    pub const ALL: [RequestOutcome; 9] = [
        Self::Processed,
        Self::Stored,
        Self::Duplicate,
        Self::Offsite,
        Self::DeadLink,
        Self::Unreachable,
        Self::TimedOut,
        Self::Failed,
        Self::StorageFailed,
    ];

    /// Classifies a fetch failure
    pub fn from_fetch_error(error: &FetchError) -> Self {
        match error {
            FetchError::Status { status, .. } if *status == 404 || *status == 410 => {
                Self::DeadLink
            }
            FetchError::Timeout { .. } => Self::TimedOut,
            FetchError::Http { source, .. } if source.is_timeout() => Self::TimedOut,
            FetchError::Http { source, .. } if source.is_connect() => Self::Unreachable,
            _ => Self::Failed,
        }
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed | Self::Stored)
    }

    /// Returns true if the request was never dispatched
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Duplicate | Self::Offsite)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        !self.is_success() && !self.is_skipped()
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Processed => "processed",
            Self::Stored => "stored",
            Self::Duplicate => "duplicate",
            Self::Offsite => "offsite",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::TimedOut => "timed_out",
            Self::Failed => "failed",
            Self::StorageFailed => "storage_failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let not_found = FetchError::Status {
            url: "https://example.com/x".to_string(),
            status: 404,
        };
        assert_eq!(RequestOutcome::from_fetch_error(&not_found), RequestOutcome::DeadLink);

        let server_error = FetchError::Status {
            url: "https://example.com/x".to_string(),
            status: 503,
        };
        assert_eq!(RequestOutcome::from_fetch_error(&server_error), RequestOutcome::Failed);
    }

    #[test]
    fn test_timeout_classification() {
        let timeout = FetchError::Timeout {
            url: "https://example.com/slow".to_string(),
        };
        assert_eq!(RequestOutcome::from_fetch_error(&timeout), RequestOutcome::TimedOut);
    }

    #[test]
    fn test_categories_are_disjoint() {
        for outcome in RequestOutcome::ALL {
            let flags = [outcome.is_success(), outcome.is_skipped(), outcome.is_error()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{:?}", outcome);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(RequestOutcome::DeadLink.to_string(), "dead_link");
        assert_eq!(RequestOutcome::StorageFailed.to_string(), "storage_failed");
    }
}
