//! Domain classifier.
//!
//! This module provides the `Classifier` that probes a single domain over
//! plain HTTP and maps the outcome onto the fixed `Status` taxonomy.
//!
//! The decision itself lives in [`classify_response`], which is pure and
//! works on an already-read body plus the final redirect location. The
//! network part (request, single retry, body read) is in [`Classifier`].

use crate::error::DomainProbeError;
use crate::types::{ClassificationResult, ProbeConfig, Status};
use crate::utils::{redirect_host, stays_on_domain};
use reqwest::header::LOCATION;
use reqwest::{Response, Url};
use std::fmt;
use std::future::Future;
use tracing::debug;

/// Lower-cased marker that identifies the expected site template.
pub const VALID_MARKER: &str = "pagemetaid";

/// Maximum number of HTTP attempts per domain (the first try plus one retry).
pub const MAX_ATTEMPTS: u32 = 2;

/// Maximum number of redirect hops the HTTP client follows.
pub const MAX_REDIRECTS: usize = 10;

/// Message used when nothing more specific identifies a parked page.
pub const GENERIC_PARKED_MESSAGE: &str =
    "domain valid but doesn't contain PageMetaID - likely parked";

/// Body markers checked after the valid marker and redirect test,
/// highest priority first.
const BODY_MARKERS: [(&str, Status, &str); 3] = [
    (
        "www.footballfanatics.com",
        Status::Old,
        "Likely an old fanatics codebase?",
    ),
    ("godaddy", Status::Parked, "godaddy"),
    ("imptestrm.com", Status::Parked, "imptestrm.com"),
];

/// Anything that can turn a domain name into a classification.
///
/// The worker pool is generic over this trait so it can drive the real
/// HTTP classifier or any other implementation.
pub trait DomainClassifier: Send + Sync {
    /// Classify one domain. Never fails: problems become `HttpError` or
    /// `IoError` results.
    fn classify(&self, domain: &str) -> impl Future<Output = ClassificationResult> + Send;
}

/// HTTP classifier that probes `http://{domain}`.
///
/// Holds a single `reqwest::Client` configured with the per-attempt timeout
/// and a limited redirect policy. Cloning is cheap and clones share the
/// client's connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use domain_probe_lib::{Classifier, DomainClassifier};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let classifier = Classifier::new()?;
///     let result = classifier.classify("example.com").await;
///     println!("{}: {} {}", result.domain, result.status, result.message);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Classifier {
    /// HTTP client shared by all probes
    http_client: reqwest::Client,
}

impl Classifier {
    /// Create a classifier with the default configuration (10 second timeout).
    pub fn new() -> Result<Self, DomainProbeError> {
        Self::with_config(&ProbeConfig::default())
    }

    /// Create a classifier from a custom configuration.
    pub fn with_config(config: &ProbeConfig) -> Result<Self, DomainProbeError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| {
                DomainProbeError::network_with_source(
                    "Failed to create probe HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self { http_client })
    }

    /// Probe a domain and classify the response.
    ///
    /// 1. GET `http://{domain}`, retrying once on transport failure
    /// 2. Read the full body
    /// 3. Classify body and final location with [`classify_response`]
    async fn probe(&self, domain: &str) -> ClassificationResult {
        let url = format!("http://{}", domain);
        debug!(domain, "probing");

        let response =
            match with_single_retry(|_attempt| self.http_client.get(url.as_str()).send()).await {
                Ok(response) => response,
                Err(e) => {
                    debug!(domain, error = %e, "probe failed after retry");
                    return ClassificationResult::new(domain, Status::HttpError, e.to_string());
                }
            };

        let location = final_location(&url, &response);

        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(domain, error = %e, "failed to read response body");
                return ClassificationResult::new(domain, Status::IoError, e.to_string());
            }
        };

        let body = String::from_utf8_lossy(&body);
        let result = classify_response(domain, &body, location.as_ref());
        debug!(domain, status = %result.status, "classified");
        result
    }
}

impl DomainClassifier for Classifier {
    fn classify(&self, domain: &str) -> impl Future<Output = ClassificationResult> + Send {
        self.probe(domain)
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier").finish_non_exhaustive()
    }
}

/// Run `operation`, retrying it once immediately if the first attempt fails.
///
/// The closure receives the attempt number (starting at 1). At most
/// [`MAX_ATTEMPTS`] attempts are made; the error of the last one is returned.
pub async fn with_single_retry<T, E, F, Fut>(mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < MAX_ATTEMPTS => {
                debug!(attempt, error = %e, "attempt failed, retrying");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Where the probe ended up, if anywhere other than the requested URL.
///
/// A `Location` header on the final response wins (resolved against the
/// final URL). Otherwise the final URL counts when redirects were followed.
fn final_location(requested: &str, response: &Response) -> Option<Url> {
    let final_url = response.url();

    if let Some(location) = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| final_url.join(value).ok())
    {
        return Some(location);
    }

    match Url::parse(requested) {
        Ok(requested) if &requested == final_url => None,
        _ => Some(final_url.clone()),
    }
}

/// Classify a fetched response.
///
/// Priority order:
/// 1. body contains `pagemetaid` (case-insensitive) → `Valid`
/// 2. `location` host does not contain `domain` → `Redirected` (message = host)
/// 3. `www.footballfanatics.com` → `Old`
/// 4. `godaddy` → `Parked`
/// 5. `imptestrm.com` → `Parked`
/// 6. anything else → `Parked` with a generic hint
pub fn classify_response(domain: &str, body: &str, location: Option<&Url>) -> ClassificationResult {
    let body = body.to_lowercase();

    if body.contains(VALID_MARKER) {
        return ClassificationResult::valid(domain);
    }

    if let Some(host) = location.and_then(redirect_host) {
        if !stays_on_domain(&host, &domain.to_lowercase()) {
            return ClassificationResult::new(domain, Status::Redirected, host);
        }
    }

    for (marker, status, message) in BODY_MARKERS {
        if body.contains(marker) {
            return ClassificationResult::new(domain, status, message);
        }
    }

    ClassificationResult::new(domain, Status::Parked, GENERIC_PARKED_MESSAGE)
}
