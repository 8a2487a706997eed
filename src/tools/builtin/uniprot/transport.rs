use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

pub const DEFAULT_BASE_URL: &str = "https://rest.uniprot.org";

/// A composed UniProtKB search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub size: u32,
    /// Field projection. Empty means the backend's default record shape.
    pub fields: Vec<String>,
}

/// One page of search results as the backend returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub total_results: Option<u64>,
    pub payload: Value,
}

impl SearchPage {
    /// The record mappings in the payload's `results` array.
    pub fn records(&self) -> &[Value] {
        self.payload["results"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Performs the network call. Owns its own timeout policy; the dispatcher
/// never retries.
#[async_trait]
pub trait UniProtTransport: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, TransportError>;
}

#[async_trait]
impl UniProtTransport for Box<dyn UniProtTransport> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, TransportError> {
        (**self).search(request).await
    }
}

/// UniProt REST client for `/uniprotkb/search`.
pub struct UniProtClient {
    client: reqwest::Client,
    base_url: String,
}

impl UniProtClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn query_params(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", request.query.clone()),
            ("size", request.size.to_string()),
            ("format", "json".to_string()),
        ];
        if !request.fields.is_empty() {
            params.push(("fields", request.fields.join(",")));
        }
        params
    }
}

impl Default for UniProtClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UniProtTransport for UniProtClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, TransportError> {
        debug!(query = %request.query, size = request.size, "uniprot search");

        let resp = self
            .client
            .get(format!("{}/uniprotkb/search", self.base_url))
            .query(&Self::query_params(request))
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = resp.status().as_u16();
        let total_results = resp
            .headers()
            .get("x-total-results")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if status != 200 {
            return Err(TransportError::ApiError { status, body: text });
        }

        let payload: Value =
            serde_json::from_str(&text).map_err(|e| TransportError::Parse(e.to_string()))?;

        Ok(SearchPage {
            total_results,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_include_fields_only_when_requested() {
        let mut req = SearchRequest {
            query: "gene:TP53".into(),
            size: 5,
            fields: vec![],
        };
        let params = UniProtClient::query_params(&req);
        assert!(params.iter().all(|(k, _)| *k != "fields"));
        assert!(params.contains(&("size", "5".to_string())));

        req.fields = vec!["accession".into(), "length".into()];
        let params = UniProtClient::query_params(&req);
        assert!(params.contains(&("fields", "accession,length".to_string())));
    }

    #[test]
    fn base_url_is_trimmed() {
        let client = UniProtClient::new().with_base_url("http://localhost:8080/");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn records_reads_results_array() {
        let page = SearchPage {
            total_results: Some(2),
            payload: json!({"results": [{"primaryAccession": "P1"}, {"primaryAccession": "P2"}]}),
        };
        assert_eq!(page.records().len(), 2);

        let empty = SearchPage {
            total_results: None,
            payload: json!({}),
        };
        assert!(empty.records().is_empty());
    }
}
