/// Crawl status definitions and the transitions allowed between them
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents where a URL record is in its crawl lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    /// Submitted, never crawled
    Queued,

    /// A crawl is in flight
    Running,

    /// Last crawl fetched and analyzed the page
    Done,

    /// Last crawl could not retrieve the page
    Error,
}

impl CrawlStatus {
    /// Returns true if the state machine permits moving from `self` to `next`
    ///
    /// | From | Allowed targets |
    /// |------|-----------------|
    /// | queued | running |
    /// | running | done, error |
    /// | done | running |
    /// | error | running |
    ///
    /// Staying in the same status is not a transition and is always allowed,
    /// except for `running`: a second crawl request on a running record is
    /// exactly the conflict this table exists to reject.
    pub fn can_transition_to(&self, next: CrawlStatus) -> bool {
        match (self, next) {
            (Self::Running, Self::Running) => false,
            (from, to) if *from == to => true,
            (Self::Queued, Self::Running) => true,
            (Self::Running, Self::Done) | (Self::Running, Self::Error) => true,
            (Self::Done, Self::Running) | (Self::Error, Self::Running) => true,
            _ => false,
        }
    }

    /// Converts the status to its database/JSON string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "running" => Some(Self::Running),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns all statuses in lifecycle order
    pub fn all_statuses() -> [Self; 4] {
        [Self::Queued, Self::Running, Self::Done, Self::Error]
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
