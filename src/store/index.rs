//! Client for a single search index.

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use url::Url;

use crate::store::StoreError;

/// Document CRUD against one index of the search cluster.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    client: Client,
    base_url: Url,
    index: String,
}

impl DocumentIndex {
    pub fn new(client: Client, base_url: &str, index: impl Into<String>) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url).map_err(|e| StoreError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Url(format!("{base_url} cannot be a base url")));
        }
        Ok(Self {
            client,
            base_url,
            index: index.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.index
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(&self.index).extend(segments);
        }
        url
    }

    async fn send(&self, method: Method, segments: &[&str], body: Option<&Value>) -> Result<Response, StoreError> {
        let mut request = self.client.request(method, self.url(segments));
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Returns whether the index exists.
    pub async fn exists(&self) -> Result<bool, StoreError> {
        let response = self.send(Method::HEAD, &[], None).await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(status_error(response).await),
        }
    }

    /// Create the index with `mapping` unless it already exists.
    ///
    /// Returns true if the index was created.
    pub async fn ensure_index(&self, mapping: &Value) -> Result<bool, StoreError> {
        if self.exists().await? {
            tracing::info!(index = %self.index, "Index already exists, skipping creation");
            return Ok(false);
        }

        let response = self.send(Method::PUT, &[], Some(mapping)).await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        tracing::info!(index = %self.index, "Index created");
        Ok(true)
    }

    /// Fetch the raw `_source` of a document.
    pub async fn get_raw(&self, id: &str) -> Result<Value, StoreError> {
        let response = self.send(Method::GET, &["_doc", id], None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let mut hit: Value = response.json().await?;
        match hit.get_mut("_source") {
            Some(source) => Ok(source.take()),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }

    /// Fetch and deserialize a document.
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.get_raw(id).await?)?)
    }

    /// Create or replace a document.
    pub async fn put<T: Serialize>(&self, id: &str, doc: &T) -> Result<(), StoreError> {
        let body = serde_json::to_value(doc)?;
        let response = self.send(Method::PUT, &["_doc", id], Some(&body)).await?;
        self.acknowledge("put", id, response).await
    }

    /// Partially update a document with the given top-level fields.
    pub async fn update(&self, id: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let body = json!({ "doc": fields });
        let response = self.send(Method::POST, &["_update", id], Some(&body)).await?;
        self.acknowledge("update", id, response).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let response = self.send(Method::DELETE, &["_doc", id], None).await?;
        self.acknowledge("delete", id, response).await
    }

    async fn acknowledge(&self, op: &str, id: &str, response: Response) -> Result<(), StoreError> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id.to_string())),
            status if status.is_success() => {
                let raw = response.text().await.unwrap_or_default();
                tracing::debug!(index = %self.index, op, id, response = %raw, "Search engine response");
                Ok(())
            }
            _ => Err(status_error(response).await),
        }
    }
}

async fn status_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    StoreError::Status { status, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let index = DocumentIndex::new(Client::new(), "http://localhost:9200/", ".users").unwrap();
        assert_eq!(
            index.url(&["_doc", "alice"]).as_str(),
            "http://localhost:9200/.users/_doc/alice"
        );

        let prefixed = DocumentIndex::new(Client::new(), "http://proxy/search", "logs").unwrap();
        assert_eq!(prefixed.url(&[]).as_str(), "http://proxy/search/logs");
    }

    #[test]
    fn test_ids_are_escaped() {
        let index = DocumentIndex::new(Client::new(), "http://localhost:9200", "users").unwrap();
        assert_eq!(
            index.url(&["_doc", "a/b c"]).as_str(),
            "http://localhost:9200/users/_doc/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            DocumentIndex::new(Client::new(), "mailto:ops@example.com", "users"),
            Err(StoreError::Url(_))
        ));
        assert!(matches!(
            DocumentIndex::new(Client::new(), "not a url", "users"),
            Err(StoreError::Url(_))
        ));
    }
}
