//! URL canonicalization and resolution against the documentation origin.

use url::Url;

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize an absolute URL string so equal pages share a cache key.
///
/// - Trim surrounding whitespace
/// - Default the scheme to `https://` if missing
/// - Accept only http/https
/// - Drop the fragment (the `url` crate already lowercases hosts)
pub fn canonicalize(input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let with_scheme = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };
    let mut parsed = Url::parse(&with_scheme).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);
    Ok(parsed)
}

/// Resolve `input` against `base`.
///
/// Absolute URLs are canonicalized as-is. Anything else is a path below the
/// base (a leading `/` does not escape to the host root). Without a base the
/// input is treated as a host-relative absolute URL.
pub fn resolve(base: Option<&Url>, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    match base {
        Some(base) if !trimmed.contains("://") => {
            let joined = base
                .join(trimmed.trim_start_matches('/'))
                .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
            canonicalize(joined.as_str())
        }
        _ => canonicalize(trimmed),
    }
}

/// Ensure a base URL ends with `/` so `join` appends rather than replaces.
pub fn as_base(input: &str) -> Result<Url, UrlError> {
    let mut url = canonicalize(input)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
