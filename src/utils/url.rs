// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative URL against a base URL.
///
/// Falls back to `href` unchanged when it cannot be joined.
///
/// # Examples
/// ```
/// use counsel_crawler::utils::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/path/index.htm").unwrap();
/// assert_eq!(resolve(&base, "a.pdf"), "https://example.com/path/a.pdf");
/// ```
pub fn resolve(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// `scheme://host[:port]/path` with query and fragment removed.
pub fn strip_query(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Whether any query parameter name matches one of `params`, ignoring case.
pub fn has_query_param(url: &Url, params: &[String]) -> bool {
    url.query_pairs()
        .any(|(key, _)| params.iter().any(|p| p.eq_ignore_ascii_case(&key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_absolute_url() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve(&base, "https://other.com/page"),
            "https://other.com/page"
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        let base = Url::parse("https://example.com/path/").unwrap();
        assert_eq!(
            resolve(&base, "/root.pdf"),
            "https://example.com/root.pdf"
        );
    }

    #[test]
    fn test_resolve_relative_from_file() {
        let base = Url::parse("https://apdhte.nic.in/JEE_dhe_24.htm").unwrap();
        assert_eq!(
            resolve(&base, "pdfs/round1.pdf"),
            "https://apdhte.nic.in/pdfs/round1.pdf"
        );
    }

    #[test]
    fn test_strip_query() {
        let url = Url::parse("https://bucket.s3.amazonaws.com:8443/a/b.pdf?x=1#top").unwrap();
        assert_eq!(strip_query(&url), "https://bucket.s3.amazonaws.com:8443/a/b.pdf");
    }

    #[test]
    fn test_has_query_param_ignores_case() {
        let url = Url::parse("https://h/f.pdf?x-amz-signature=abc").unwrap();
        assert!(has_query_param(&url, &["X-Amz-Signature".to_string()]));
        assert!(!has_query_param(&url, &["token".to_string()]));
    }
}
