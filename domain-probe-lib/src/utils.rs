//! Utility functions for domain input handling and URL inspection.

use reqwest::Url;

/// Clean a raw domain value read from an input source.
///
/// Trims surrounding whitespace and returns `None` for values that are
/// empty or are comments. No further validation happens here: malformed
/// names are still probed and degrade to an `http error` result.
pub fn clean_domain_input(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    Some(trimmed.to_string())
}

/// Host part of a URL including an explicit port, e.g. `shop.example.net`
/// or `127.0.0.1:8080`.
///
/// Default ports are omitted by the URL parser, so `http://example.com:80/`
/// yields `example.com`.
pub fn redirect_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Whether a redirect target still belongs to the probed domain.
///
/// Matching is a plain substring test on the host, so `www.example.com`
/// and `shop.example.com` both count as staying on `example.com`.
pub fn stays_on_domain(target_host: &str, domain: &str) -> bool {
    target_host.contains(domain)
}
