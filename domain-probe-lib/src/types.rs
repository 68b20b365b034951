//! Core data types for domain classification.
//!
//! This module defines the fixed status taxonomy, the per-domain
//! classification record, and the configuration passed into the classifier
//! and worker pool.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Default number of concurrent probe workers.
pub const DEFAULT_POOL_SIZE: usize = 200;

/// Upper bound for the worker pool size.
pub const MAX_POOL_SIZE: usize = 1000;

/// Default per-attempt HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of probing a single domain.
///
/// This is a closed set. The serialized forms match the strings written to
/// the output CSV (`valid`, `parked`, `redirected`, `old`, `http error`,
/// `io error`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Body carries the site template marker
    #[serde(rename = "valid")]
    Valid,

    /// Domain answers but serves no site-specific content
    #[serde(rename = "parked")]
    Parked,

    /// Final location is on a different host
    #[serde(rename = "redirected")]
    Redirected,

    /// Legacy fanatics codebase
    #[serde(rename = "old")]
    Old,

    /// Transport failure that survived the single retry
    #[serde(rename = "http error")]
    HttpError,

    /// Response arrived but the body could not be read
    #[serde(rename = "io error")]
    IoError,
}

impl Status {
    /// Every status, in report order.
    pub const ALL: [Status; 6] = [
        Status::Valid,
        Status::Parked,
        Status::Redirected,
        Status::Old,
        Status::HttpError,
        Status::IoError,
    ];

    /// The string used in CSV/JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Valid => "valid",
            Status::Parked => "parked",
            Status::Redirected => "redirected",
            Status::Old => "old",
            Status::HttpError => "http error",
            Status::IoError => "io error",
        }
    }

}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown status '{}'", s))
    }
}

/// Classification of one probed domain.
///
/// Created exactly once per input domain and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The domain name that was probed (e.g., "example.com")
    pub domain: String,

    /// Outcome of the probe
    pub status: Status,

    /// Diagnostic detail: error text, redirect host or parked hint.
    /// Empty for valid domains.
    pub message: String,
}

impl ClassificationResult {
    /// Create a result with a diagnostic message.
    pub fn new<D: Into<String>, M: Into<String>>(domain: D, status: Status, message: M) -> Self {
        Self {
            domain: domain.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a `Valid` result, which never carries a message.
    pub fn valid<D: Into<String>>(domain: D) -> Self {
        Self::new(domain, Status::Valid, String::new())
    }

    /// Whether this domain was confirmed valid.
    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }
}

/// Configuration for probing operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Number of concurrent workers
    /// Default: 200, Minimum: 1
    pub pool_size: usize,

    /// Timeout applied independently to each HTTP attempt
    /// Default: 10 seconds
    #[serde(skip)] // Don't serialize Duration directly
    pub timeout: Duration,

    /// User-Agent header sent with every probe
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("domain-probe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ProbeConfig {
    /// Set the worker count. Zero is raised to one.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
