//! Elasticsearch client wrapper

use async_trait::async_trait;
use elasticsearch::http::transport::Transport;
use elasticsearch::{DeleteParts, Elasticsearch, IndexParts, SearchParts};
use serde_json::Value;
use thiserror::Error;

use super::document::LinkDocument;
use super::mirror::MirrorStore;
use super::query::build_search_query;

/// Upper bound on hits fetched per search; pagination happens in-process
/// after filtering, so the query asks for everything up to this cap.
const MAX_RESULTS: i64 = 10_000;

/// Errors from the search backend
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search transport error: {0}")]
    Transport(#[from] elasticsearch::http::transport::BuildError),

    #[error("search request failed: {0}")]
    Request(#[from] elasticsearch::Error),

    #[error("search returned status {0}")]
    BadStatus(u16),
}

/// Wrapper around the Elasticsearch client bound to one index
///
/// Documents are routed by owner id so a user's queries hit a single shard
/// instead of scanning the whole corpus.
pub struct SearchClient {
    client: Elasticsearch,
    index: String,
}

impl SearchClient {
    /// Connects to a single-node cluster at the given URL
    pub fn new(url: &str, index: &str) -> Result<Self, SearchError> {
        let transport = Transport::single_node(url)?;

        Ok(SearchClient {
            client: Elasticsearch::new(transport),
            index: index.to_string(),
        })
    }

    /// Indexes or replaces a link document
    ///
    /// The document must carry its owner; it doubles as the routing key.
    pub async fn index_link(&self, doc: &LinkDocument) -> Result<(), SearchError> {
        let owner = doc.owner.unwrap_or_default().to_string();
        let id = doc.id.to_string();

        let response = self
            .client
            .index(IndexParts::IndexId(&self.index, &id))
            .routing(&owner)
            .body(doc)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchError::BadStatus(status.as_u16()));
        }

        Ok(())
    }

    /// Removes a link document from the index
    ///
    /// Deleting a document that was never indexed reports not-found, which
    /// is not an error here.
    pub async fn delete_link(&self, owner_id: i64, link_id: i64) -> Result<(), SearchError> {
        let owner = owner_id.to_string();
        let id = link_id.to_string();

        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index, &id))
            .routing(&owner)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() && status.as_u16() != 404 {
            return Err(SearchError::BadStatus(status.as_u16()));
        }

        Ok(())
    }

    /// Free-text search over one user's links
    ///
    /// Hits come back stripped of index-only fields, interchangeable with
    /// links read from the primary store.
    pub async fn search(
        &self,
        owner_id: i64,
        text: &str,
        tags: &[String],
        domains: &[String],
        exclusive_tags: bool,
    ) -> Result<Vec<LinkDocument>, SearchError> {
        let owner = owner_id.to_string();
        let query = build_search_query(owner_id, text, tags, domains, exclusive_tags);

        let response = self
            .client
            .search(SearchParts::Index(&[&self.index]))
            .routing(&[owner.as_str()])
            .size(MAX_RESULTS)
            .body(query)
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(SearchError::BadStatus(status.as_u16()));
        }

        let body: Value = response.json().await?;

        let mut docs = Vec::new();
        if let Some(hits) = body["hits"]["hits"].as_array() {
            for hit in hits {
                if let Ok(doc) = serde_json::from_value::<LinkDocument>(hit["_source"].clone()) {
                    docs.push(doc.for_response());
                }
            }
        }

        Ok(docs)
    }
}

#[async_trait]
impl MirrorStore for SearchClient {
    async fn index_document(&self, doc: LinkDocument) -> anyhow::Result<()> {
        self.index_link(&doc).await?;
        Ok(())
    }

    async fn delete_document(&self, owner_id: i64, link_id: i64) -> anyhow::Result<()> {
        self.delete_link(owner_id, link_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Building a client touches only the transport, no network.
    #[test]
    fn test_client_construction() {
        assert!(SearchClient::new("http://localhost:9200", "linkstash").is_ok());
    }

    #[test]
    fn test_rejects_malformed_url() {
        assert!(SearchClient::new("not a url", "linkstash").is_err());
    }
}
