//! Browse pipeline tests
//!
//! Exercises the pure part of the browse flow end to end: candidate
//! documents go through the filter, pagination, and the response envelope,
//! exactly as the handler composes them. Database- and search-backed
//! scenarios need live services and live in DESIGN.md's test notes instead.

use linkstash_api::routes::links::BrowseResponse;
use linkstash_shared::filter::{paginate, LinkFilter};
use linkstash_shared::search::LinkDocument;

fn doc(id: i64, domain: &str, tags: &[&str]) -> LinkDocument {
    LinkDocument {
        id,
        title: format!("Link {id}"),
        description: String::new(),
        timestamp: 1700000000 + id,
        url: format!("https://{domain}/{id}"),
        domain: domain.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        owner: None,
        html: None,
    }
}

fn corpus() -> Vec<LinkDocument> {
    vec![
        doc(1, "example.com", &["rust", "news"]),
        doc(2, "example.com", &["rust"]),
        doc(3, "other.org", &["news"]),
        doc(4, "other.org", &[]),
        doc(5, "example.com", &["rust", "news", "archive"]),
    ]
}

fn browse(
    candidates: Vec<LinkDocument>,
    filter: &LinkFilter,
    page: i64,
    page_size: i64,
) -> BrowseResponse {
    let matched: Vec<LinkDocument> = candidates
        .into_iter()
        .filter(|link| filter.matches(&link.domain, &link.tags))
        .collect();
    let (links, total_count) = paginate(matched, page, page_size);
    BrowseResponse { links, total_count }
}

#[test]
fn unfiltered_browse_returns_everything_in_order() {
    let response = browse(corpus(), &LinkFilter::default(), 0, 0);

    assert_eq!(response.total_count, 5);
    let ids: Vec<i64> = response.links.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn exclusive_tags_and_domain_combine() {
    let filter = LinkFilter {
        tags: vec!["rust".to_string(), "news".to_string()],
        exclusive_tags: true,
        domains: vec!["example.com".to_string()],
    };

    let response = browse(corpus(), &filter, 0, 0);
    let ids: Vec<i64> = response.links.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![1, 5]);
}

#[test]
fn total_count_reports_pre_pagination_matches() {
    let filter = LinkFilter {
        tags: vec!["rust".to_string(), "news".to_string()],
        exclusive_tags: false,
        domains: Vec::new(),
    };

    let response = browse(corpus(), &filter, 1, 2);
    assert_eq!(response.total_count, 4);
    assert_eq!(response.links.len(), 2);

    let last_page = browse(corpus(), &filter, 2, 3);
    assert_eq!(last_page.total_count, 4);
    assert_eq!(last_page.links.len(), 1);
}

#[test]
fn page_past_the_end_keeps_envelope_shape() {
    let response = browse(corpus(), &LinkFilter::default(), 10, 10);
    assert_eq!(response.total_count, 5);
    assert!(response.links.is_empty());

    // The serialized envelope still carries an array, never null.
    let json = serde_json::to_value(&response).unwrap();
    assert!(json["links"].as_array().unwrap().is_empty());
    assert_eq!(json["totalCount"], 5);
}

#[test]
fn envelope_documents_hide_index_fields() {
    let mut candidates = corpus();
    // Simulate a mirror hit that was stripped on the way out.
    candidates[0] = candidates[0]
        .clone()
        .for_index(7, Some("<html></html>".to_string()))
        .for_response();

    let response = browse(candidates, &LinkFilter::default(), 1, 1);
    let json = serde_json::to_value(&response).unwrap();
    let first = &json["links"][0];
    assert!(first.get("owner").is_none());
    assert!(first.get("html").is_none());
}
