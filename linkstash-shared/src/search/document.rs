//! Denormalized link document
//!
//! One struct serves two purposes: it is the JSON shape returned to clients
//! and the document body indexed into the search mirror. The `owner` and
//! `html` fields only appear in the indexed form; serde omits them entirely
//! when unset, so client responses never carry them.

use serde::{Deserialize, Serialize};

use crate::models::link::Link;

/// A link flattened for JSON transport and search indexing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDocument {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub timestamp: i64,
    pub url: String,
    pub domain: String,
    pub tags: Vec<String>,

    /// Owning user, set only on documents sent to the index
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub owner: Option<i64>,

    /// Raw page body, set only on documents sent to the index
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub html: Option<String>,
}

impl LinkDocument {
    /// Prepares this document for indexing by attaching the owner and the
    /// fetched page body
    pub fn for_index(mut self, owner: i64, html: Option<String>) -> Self {
        self.owner = Some(owner);
        self.html = html;
        self
    }

    /// Strips index-only fields so the document matches the client-facing
    /// shape
    pub fn for_response(mut self) -> Self {
        self.owner = None;
        self.html = None;
        self
    }
}

impl From<&Link> for LinkDocument {
    fn from(link: &Link) -> Self {
        LinkDocument {
            id: link.id,
            title: link.title.clone(),
            description: link.description.clone(),
            timestamp: link.timestamp,
            url: link.url.clone(),
            domain: link.domain.clone(),
            tags: link.tags.clone(),
            owner: None,
            html: None,
        }
    }
}

impl From<Link> for LinkDocument {
    fn from(link: Link) -> Self {
        LinkDocument {
            id: link.id,
            title: link.title,
            description: link.description,
            timestamp: link.timestamp,
            url: link.url,
            domain: link.domain,
            tags: link.tags,
            owner: None,
            html: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LinkDocument {
        LinkDocument {
            id: 1,
            title: "Example".to_string(),
            description: "".to_string(),
            timestamp: 1700000000,
            url: "https://example.com/".to_string(),
            domain: "example.com".to_string(),
            tags: vec!["a".to_string()],
            owner: None,
            html: None,
        }
    }

    #[test]
    fn test_response_form_omits_index_fields() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("owner").is_none());
        assert!(json.get("html").is_none());
        assert_eq!(json["id"], 1);
        assert_eq!(json["domain"], "example.com");
    }

    #[test]
    fn test_index_form_carries_owner_and_html() {
        let doc = sample().for_index(7, Some("<html></html>".to_string()));
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["owner"], 7);
        assert_eq!(json["html"], "<html></html>");
    }

    #[test]
    fn test_for_response_strips_index_fields() {
        let doc = sample().for_index(7, Some("body".to_string())).for_response();
        assert_eq!(doc, sample());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let doc: LinkDocument = serde_json::from_value(serde_json::json!({
            "id": 2,
            "title": "t",
            "description": "d",
            "timestamp": 0,
            "url": "https://x.dev/",
            "domain": "x.dev",
            "tags": []
        }))
        .unwrap();

        assert_eq!(doc.owner, None);
        assert_eq!(doc.html, None);
    }
}
