//! URL validation and normalization.
//!
//! Destination URLs are trimmed, restricted to HTTP(S) with a non-empty
//! host, and stored without their fragment.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL host must not be empty")]
    MissingHost,
}

/// Normalizes a destination URL to its stored form.
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. Scheme must be `http` or `https`; anything else - including
///    `javascript:`, `data:`, `file:` - is rejected
/// 3. Host must be non-empty
/// 4. The fragment is stripped
/// 5. Query parameters and path are preserved as-is
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed URLs,
/// [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes,
/// and [`UrlNormalizationError::MissingHost`] when the host is empty.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::InvalidFormat(
            "empty input".to_string(),
        ));
    }

    let mut url =
        Url::parse(trimmed).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if url.host_str().map(str::trim).unwrap_or("").is_empty() {
        return Err(UrlNormalizationError::MissingHost);
    }

    url.set_fragment(None);

    Ok(url.to_string())
}
