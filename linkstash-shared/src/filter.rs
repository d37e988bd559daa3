//! In-memory link filtering and pagination
//!
//! The browse endpoint fetches links from the primary store or the search
//! mirror and then narrows them here. Keeping this pure (no I/O, no async)
//! makes the selection semantics directly unit-testable.

use std::collections::HashSet;

/// Criteria for narrowing a set of links
///
/// All criteria are ANDed together. An empty criterion always passes.
#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    /// Requested tag names
    pub tags: Vec<String>,

    /// If true, a link must carry every distinct requested tag; otherwise
    /// carrying any one of them is enough
    pub exclusive_tags: bool,

    /// Accepted domains, matched by exact equality
    pub domains: Vec<String>,
}

impl LinkFilter {
    /// Whether a link with the given domain and tags passes the filter
    pub fn matches(&self, domain: &str, link_tags: &[String]) -> bool {
        self.matches_tags(link_tags) && self.matches_domain(domain)
    }

    fn matches_tags(&self, link_tags: &[String]) -> bool {
        if self.tags.is_empty() {
            return true;
        }

        if self.exclusive_tags {
            // Distinct requested tags only, so a duplicated request entry
            // does not demand the tag twice.
            let have: HashSet<&str> = link_tags.iter().map(String::as_str).collect();
            self.tags.iter().all(|t| have.contains(t.as_str()))
        } else {
            self.tags.iter().any(|t| link_tags.contains(t))
        }
    }

    fn matches_domain(&self, domain: &str) -> bool {
        self.domains.is_empty() || self.domains.iter().any(|d| d == domain)
    }
}

/// Slices out one page of items, returning it with the pre-pagination count
///
/// Pages are 1-indexed. A non-positive `page` or `page_size` disables
/// pagination and returns everything. A page past the end yields an empty
/// slice rather than an error. The input order is preserved.
pub fn paginate<T>(items: Vec<T>, page: i64, page_size: i64) -> (Vec<T>, usize) {
    let total = items.len();

    if page <= 0 || page_size <= 0 {
        return (items, total);
    }

    // Offsets come straight from client input; an overflowing page is
    // simply past the end.
    let from = match (page - 1).checked_mul(page_size) {
        Some(from) if (from as usize) < total => from as usize,
        _ => return (Vec::new(), total),
    };

    let to = (from + page_size as usize).min(total);
    let page_items = items.into_iter().skip(from).take(to - from).collect();

    (page_items, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = LinkFilter::default();
        assert!(filter.matches("example.com", &tags(&["a"])));
        assert!(filter.matches("", &[]));
    }

    #[test]
    fn test_inclusive_tags_match_any() {
        let filter = LinkFilter {
            tags: tags(&["rust", "news"]),
            exclusive_tags: false,
            domains: Vec::new(),
        };

        assert!(filter.matches("example.com", &tags(&["rust"])));
        assert!(filter.matches("example.com", &tags(&["news", "other"])));
        assert!(!filter.matches("example.com", &tags(&["other"])));
        assert!(!filter.matches("example.com", &[]));
    }

    #[test]
    fn test_exclusive_tags_require_all() {
        let filter = LinkFilter {
            tags: tags(&["rust", "news"]),
            exclusive_tags: true,
            domains: Vec::new(),
        };

        assert!(filter.matches("example.com", &tags(&["rust", "news", "other"])));
        assert!(!filter.matches("example.com", &tags(&["rust"])));
        assert!(!filter.matches("example.com", &[]));
    }

    #[test]
    fn test_exclusive_duplicate_request_tags() {
        // ["a", "a"] demands only the distinct tag "a".
        let filter = LinkFilter {
            tags: tags(&["a", "a"]),
            exclusive_tags: true,
            domains: Vec::new(),
        };

        assert!(filter.matches("example.com", &tags(&["a"])));
        assert!(!filter.matches("example.com", &tags(&["b"])));
    }

    #[test]
    fn test_domain_filter() {
        let filter = LinkFilter {
            tags: Vec::new(),
            exclusive_tags: false,
            domains: tags(&["example.com", "other.org"]),
        };

        assert!(filter.matches("example.com", &[]));
        assert!(filter.matches("other.org", &[]));
        assert!(!filter.matches("sub.example.com", &[]));
        assert!(!filter.matches("", &[]));
    }

    #[test]
    fn test_tag_and_domain_are_anded() {
        let filter = LinkFilter {
            tags: tags(&["rust"]),
            exclusive_tags: false,
            domains: tags(&["example.com"]),
        };

        assert!(filter.matches("example.com", &tags(&["rust"])));
        assert!(!filter.matches("example.com", &tags(&["news"])));
        assert!(!filter.matches("other.org", &tags(&["rust"])));
    }

    #[test]
    fn test_paginate_basic() {
        let (page, total) = paginate(vec![1, 2, 3, 4, 5], 1, 2);
        assert_eq!(page, vec![1, 2]);
        assert_eq!(total, 5);

        let (page, total) = paginate(vec![1, 2, 3, 4, 5], 2, 2);
        assert_eq!(page, vec![3, 4]);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_paginate_last_page_clamped() {
        let (page, total) = paginate(vec![1, 2, 3, 4, 5], 3, 2);
        assert_eq!(page, vec![5]);
        assert_eq!(total, 5);
    }

    #[test]
    fn test_paginate_past_end_is_empty() {
        let (page, total) = paginate(vec![1, 2, 3], 5, 2);
        assert!(page.is_empty());
        assert_eq!(total, 3);
    }

    #[test]
    fn test_paginate_disabled_by_non_positive_params() {
        let (page, total) = paginate(vec![1, 2, 3], 0, 2);
        assert_eq!(page, vec![1, 2, 3]);
        assert_eq!(total, 3);

        let (page, total) = paginate(vec![1, 2, 3], 1, 0);
        assert_eq!(page, vec![1, 2, 3]);
        assert_eq!(total, 3);

        let (page, total) = paginate(vec![1, 2, 3], -1, -1);
        assert_eq!(page, vec![1, 2, 3]);
        assert_eq!(total, 3);
    }

    #[test]
    fn test_paginate_huge_page_is_past_the_end() {
        // Offset arithmetic must not overflow on hostile input.
        let (page, total) = paginate(vec![1, 2, 3], i64::MAX, 2);
        assert!(page.is_empty());
        assert_eq!(total, 3);

        let (page, total) = paginate(vec![1, 2, 3], 2, i64::MAX);
        assert!(page.is_empty());
        assert_eq!(total, 3);

        let (page, total) = paginate(vec![1, 2, 3], 1, i64::MAX);
        assert_eq!(page, vec![1, 2, 3]);
        assert_eq!(total, 3);
    }

    #[test]
    fn test_paginate_empty_input() {
        let (page, total) = paginate(Vec::<i32>::new(), 1, 10);
        assert!(page.is_empty());
        assert_eq!(total, 0);
    }
}
