//! Utility functions and helpers.

pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .map(|base| resolve_url(&base, href))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://ico.org.uk/action-weve-taken/enforcement/").unwrap();
        assert_eq!(
            resolve_url(&base, "/action-weve-taken/enforcement/acme-ltd/"),
            "https://ico.org.uk/action-weve-taken/enforcement/acme-ltd/"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_resolve_from_strings() {
        assert_eq!(
            resolve("https://ico.org.uk/a/", "/media/file.pdf"),
            Some("https://ico.org.uk/media/file.pdf".to_string())
        );
        assert_eq!(resolve("not a url", "/x"), None);
    }
}
