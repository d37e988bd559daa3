/// Query-string helpers
///
/// Browse and tag endpoints take repeatable parameters (`?tag=a&tag=b`) and
/// bare flags (`?delete-links`), which axum's typed `Query` extractor does
/// not model. Handlers take the `RawQuery` string and read it through this
/// small parsed form instead.

use url::form_urlencoded;

/// Parsed query-string pairs, preserving duplicates and order
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parses a raw query string (without the leading `?`)
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = match raw {
            Some(raw) => form_urlencoded::parse(raw.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            None => Vec::new(),
        };
        QueryParams(pairs)
    }

    /// First value for a key
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for a key, in query order
    pub fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Whether a flag is set
    ///
    /// Presence alone counts: `?delete-links`, `?delete-links=` and
    /// `?delete-links=1` are all set. The value is never inspected.
    pub fn flag(&self, key: &str) -> bool {
        self.first(key).is_some()
    }

    /// Integer value for a key, falling back to a default when absent or
    /// unparseable
    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.first(key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeatable_params() {
        let params = QueryParams::parse(Some("tag=a&tag=b&domain=example.com"));
        assert_eq!(params.all("tag"), vec!["a", "b"]);
        assert_eq!(params.all("domain"), vec!["example.com"]);
        assert!(params.all("missing").is_empty());
    }

    #[test]
    fn test_first_and_missing() {
        let params = QueryParams::parse(Some("search=rust+async"));
        assert_eq!(params.first("search"), Some("rust async"));
        assert_eq!(params.first("page"), None);
    }

    #[test]
    fn test_flag_presence() {
        let params = QueryParams::parse(Some("exclusivetags&delete-links=1&empty="));
        assert!(params.flag("exclusivetags"));
        assert!(params.flag("delete-links"));
        assert!(params.flag("empty"));
        assert!(!params.flag("absent"));
    }

    #[test]
    fn test_int_fallback() {
        let params = QueryParams::parse(Some("page=3&pagesize=abc"));
        assert_eq!(params.int("page", 0), 3);
        assert_eq!(params.int("pagesize", 0), 0);
        assert_eq!(params.int("missing", 25), 25);
    }

    #[test]
    fn test_empty_query() {
        let params = QueryParams::parse(None);
        assert!(params.all("tag").is_empty());
        assert!(!params.flag("exclusivetags"));
    }

    #[test]
    fn test_percent_decoding() {
        let params = QueryParams::parse(Some("tag=c%2B%2B"));
        assert_eq!(params.all("tag"), vec!["c++"]);
    }
}
