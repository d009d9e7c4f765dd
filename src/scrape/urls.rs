//! URL normalization and resolution helpers for the scraper
//!
//! User-supplied URLs arrive in whatever shape people paste them: with or
//! without a scheme, padded with whitespace, sometimes pointing at images via
//! protocol-relative or root-relative paths. These helpers canonicalize them
//! without attempting validation; a URL that normalizes into nonsense simply
//! fails at fetch time.

use url::Url;

/// Canonicalize a raw user-supplied string into a fetchable absolute URL.
///
/// Trims surrounding whitespace and prepends `https://` unless the string
/// already starts with an explicit `http://` or `https://` scheme. Callers
/// filter out blank input before reaching this point.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Resolve an image `src` or meta `content` value to an absolute URL.
///
/// Protocol-relative values (`//cdn...`) get an `https:` scheme, root-relative
/// paths (`/img...`) are joined against the source page's origin, and
/// everything else passes through unchanged.
pub fn resolve_image_url(value: &str, base: &str) -> String {
    if value.starts_with("//") {
        format!("https:{value}")
    } else if value.starts_with('/') {
        match Url::parse(base).and_then(|base_url| base_url.join(value)) {
            Ok(resolved) => resolved.to_string(),
            Err(_) => value.to_string(),
        }
    } else {
        value.to_string()
    }
}

/// Network location of a URL: the host, plus `:port` for non-default ports.
///
/// Parsing folds scheme-default ports (`:443` on https, `:80` on http) into
/// the bare host. Returns an empty string for unparseable or host-less URLs;
/// the fallback title synthesized from it degrades rather than failing.
pub fn host_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => String::new(),
        },
        Err(_) => String::new(),
    }
}
