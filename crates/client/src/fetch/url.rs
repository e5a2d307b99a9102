//! URL resolution for precache manifests.

use url::Url;

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a manifest entry against the application origin.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references against `base`; absolute URLs pass through
/// 3. Require an http or https scheme
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn resolve(base: &Url, input: &str) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve every manifest entry, keeping the first occurrence of each URL.
///
/// # Errors
///
/// Fails on the first entry that does not resolve.
pub fn resolve_manifest<S: AsRef<str>>(base: &Url, entries: &[S]) -> Result<Vec<Url>, UrlError> {
    let mut resolved: Vec<Url> = Vec::with_capacity(entries.len());
    for entry in entries {
        let url = resolve(base, entry.as_ref())?;
        if !resolved.contains(&url) {
            resolved.push(url);
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://app.test").unwrap()
    }

    #[test]
    fn test_resolve_relative() {
        let url = resolve(&origin(), "/index.html").unwrap();
        assert_eq!(url.as_str(), "https://app.test/index.html");
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&origin(), "/").unwrap();
        assert_eq!(url.as_str(), "https://app.test/");
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let url = resolve(&origin(), "https://cdn.test/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.test"));
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&origin(), "https://CDN.TEST/lib.js").unwrap();
        assert_eq!(url.host_str(), Some("cdn.test"));
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve(&origin(), "/docs#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/docs");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/app.js?v=3&b=2").unwrap();
        assert_eq!(url.query(), Some("v=3&b=2"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve(&origin(), "  /manifest.json  ").unwrap();
        assert_eq!(url.as_str(), "https://app.test/manifest.json");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve(&origin(), "file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_manifest_dedupes_in_order() {
        let entries = ["/", "/index.html", "/index.html#top", "https://app.test/", "/app.js"];
        let urls = resolve_manifest(&origin(), &entries).unwrap();
        let urls: Vec<&str> = urls.iter().map(Url::as_str).collect();
        assert_eq!(urls, vec!["https://app.test/", "https://app.test/index.html", "https://app.test/app.js"]);
    }

    #[test]
    fn test_resolve_manifest_propagates_error() {
        let entries = ["/", "ftp://files.test/a"];
        assert!(resolve_manifest(&origin(), &entries).is_err());
    }
}
