//! # Domain Probe Library
//!
//! Classifies domain names by probing each one over HTTP and inspecting
//! the response: valid sites, parked pages, cross-host redirects, old
//! codebases, and unreachable hosts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_probe_lib::{Classifier, ProbePool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = ProbePool::new(Classifier::new()?, 200);
//!     let results = pool.run(vec!["example.com".to_string()]).await?;
//!
//!     for result in &results {
//!         println!("{} {} {}", result.domain, result.status, result.message);
//!     }
//!     println!("{} valid", results.valid_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Fixed Worker Pool**: bounded number of concurrent probes sharing one work queue
//! - **Single Retry**: transient transport failures are retried once
//! - **CSV In/Out**: read domains from a column, write `domain,status,message`
//! - **Configurable**: TOML config files and `DP_*` environment variables

pub use aggregate::{summarize, Aggregator, ResultSet, Tally};
pub use classifier::{classify_response, with_single_retry, Classifier, DomainClassifier};
pub use concurrent::ProbePool;
pub use config::{
    env_config_from, load_env_config, parse_timeout_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig, OutputConfig,
};
pub use error::DomainProbeError;
pub use io::{
    read_domains, read_domains_from_reader, write_results, write_results_to_writer,
    DEFAULT_DOMAIN_COLUMN,
};
pub use types::{
    ClassificationResult, ProbeConfig, Status, DEFAULT_POOL_SIZE, DEFAULT_TIMEOUT, MAX_POOL_SIZE,
};
pub use utils::clean_domain_input;

mod aggregate;
mod classifier;
mod concurrent;
mod config;
mod error;
mod io;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainProbeError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
        default_pool_size: DEFAULT_POOL_SIZE,
        default_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
    }
}

/// Information about the library build and its defaults
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
    pub default_pool_size: usize,
    pub default_timeout_secs: u64,
}
