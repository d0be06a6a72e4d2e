//! HTTP/JSON document store client.
//!
//! Talks to a REST document service with the following shape:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | get       | `GET {base}/{collection}/{id}` → document JSON, 404 when absent |
//! | set       | `PUT {base}/{collection}/{id}?merge=true\|false` with document JSON |
//! | list      | `GET {base}/{collection}` → `[{"id": ..., "data": {...}}]` |
//! | delete    | `DELETE {base}/{collection}/{id}` |
//!
//! Collection paths are split on `/` and every segment is percent-encoded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

use super::traits::{DocumentStore, WriteMode};
use crate::{Result, WanderloreError};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for an HTTP document store.
#[derive(Clone)]
pub struct HttpDocumentStore {
    base_url: Url,
    token: Option<String>,
    http: Client,
}

impl HttpDocumentStore {
    /// Create a client for `base_url` with the default timeout.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            WanderloreError::Configuration(format!("invalid document store URL {base_url}: {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(WanderloreError::Configuration(format!(
                "document store URL {base_url} cannot be a base"
            )));
        }
        let http = Client::builder().timeout(timeout).build().map_err(|e| {
            WanderloreError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            base_url,
            token,
            http,
        })
    }

    fn url(&self, collection: &str, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(collection.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check response status and map to appropriate error.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(WanderloreError::AuthenticationFailed)
            }
            _ => {
                let message = response.text().await.unwrap_or_default();
                Err(WanderloreError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

#[derive(Deserialize)]
struct ListedDocument {
    id: String,
    data: Value,
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let response = self
            .authorize(self.http.get(self.url(collection, Some(id))))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::check_status(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: Value,
        mode: WriteMode,
    ) -> Result<()> {
        let merge = matches!(mode, WriteMode::Merge);
        let response = self
            .authorize(self.http.put(self.url(collection, Some(id))))
            .query(&[("merge", merge)])
            .json(&document)
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        let response = self
            .authorize(self.http.get(self.url(collection, None)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = Self::check_status(response).await?;
        let listed: Vec<ListedDocument> = response.json().await?;
        Ok(listed.into_iter().map(|d| (d.id, d.data)).collect())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let response = self
            .authorize(self.http.delete(self.url(collection, Some(id))))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_segments() {
        let store = HttpDocumentStore::new("https://db.example.com/v1/", None).unwrap();
        let url = store.url("users/u 1/quizzes", Some("são paulo"));
        assert_eq!(
            url.as_str(),
            "https://db.example.com/v1/users/u%201/quizzes/s%C3%A3o%20paulo"
        );
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        let err = HttpDocumentStore::new("not a url", None).err().unwrap();
        assert!(matches!(err, WanderloreError::Configuration(_)));
    }
}
