//! Search query construction
//!
//! Queries are built as plain JSON values rather than through a typed query
//! DSL, which keeps them inspectable in tests without a live cluster.

use serde_json::{json, Value};

/// Builds the bool query for a free-text browse over one user's links
///
/// The owner term lives in `filter` so it constrains results without
/// affecting scores. The page body (`html`) only nudges relevance via a
/// low-boost fuzzy `should` clause; the match requirement is carried by the
/// multi_match over url, title and description.
pub fn build_search_query(
    owner_id: i64,
    text: &str,
    tags: &[String],
    domains: &[String],
    exclusive_tags: bool,
) -> Value {
    let mut must = vec![json!({
        "multi_match": {
            "query": text,
            "fields": ["url", "title", "description"]
        }
    })];

    if !tags.is_empty() {
        if exclusive_tags {
            for tag in tags {
                must.push(json!({ "term": { "tags": tag } }));
            }
        } else {
            must.push(json!({ "terms": { "tags": tags } }));
        }
    }

    if !domains.is_empty() {
        must.push(json!({ "terms": { "domain": domains } }));
    }

    json!({
        "query": {
            "bool": {
                "filter": [
                    { "term": { "owner": owner_id } }
                ],
                "must": must,
                "should": [
                    {
                        "fuzzy": {
                            "html": {
                                "value": text,
                                "boost": 0.1
                            }
                        }
                    }
                ]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_owner_filter_present() {
        let query = build_search_query(42, "rust", &[], &[], false);
        assert_eq!(query["query"]["bool"]["filter"][0]["term"]["owner"], 42);
    }

    #[test]
    fn test_multi_match_fields() {
        let query = build_search_query(1, "async runtime", &[], &[], false);
        let mm = &query["query"]["bool"]["must"][0]["multi_match"];
        assert_eq!(mm["query"], "async runtime");
        assert_eq!(mm["fields"], json!(["url", "title", "description"]));
    }

    #[test]
    fn test_html_fuzzy_boost() {
        let query = build_search_query(1, "rust", &[], &[], false);
        let fuzzy = &query["query"]["bool"]["should"][0]["fuzzy"]["html"];
        assert_eq!(fuzzy["value"], "rust");
        assert_eq!(fuzzy["boost"], 0.1);
    }

    #[test]
    fn test_inclusive_tags_use_single_terms_clause() {
        let query = build_search_query(1, "x", &names(&["a", "b"]), &[], false);
        let must = query["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 2);
        assert_eq!(must[1]["terms"]["tags"], json!(["a", "b"]));
    }

    #[test]
    fn test_exclusive_tags_use_one_term_per_tag() {
        let query = build_search_query(1, "x", &names(&["a", "b"]), &[], true);
        let must = query["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 3);
        assert_eq!(must[1]["term"]["tags"], "a");
        assert_eq!(must[2]["term"]["tags"], "b");
    }

    #[test]
    fn test_domains_clause() {
        let query = build_search_query(1, "x", &[], &names(&["example.com"]), false);
        let must = query["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must[1]["terms"]["domain"], json!(["example.com"]));
    }

    #[test]
    fn test_no_optional_clauses_without_tags_or_domains() {
        let query = build_search_query(1, "x", &[], &[], true);
        let must = query["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 1);
    }
}
