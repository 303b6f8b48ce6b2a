use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::search::{MediaSearchProvider, SearchError};

const VIDEOS_ENDPOINT: &str = "https://google.serper.dev/videos";
const IMAGES_ENDPOINT: &str = "https://google.serper.dev/images";

/// Video and image search through the Serper API. Results are passed
/// through as the backend returned them; the dispatcher only guarantees the
/// empty shape on failure.
pub struct SerperClient {
    client: Client,
    api_key: String,
}

impl SerperClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    async fn query(
        &self,
        endpoint: &str,
        query: &str,
        max_results: u32,
    ) -> Result<serde_json::Value, SearchError> {
        let response = self
            .client
            .post(endpoint)
            .header("X-API-KEY", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&json!({ "q": query, "num": max_results }))
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(format!("Serper Error {}: {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))
    }
}

#[async_trait]
impl MediaSearchProvider for SerperClient {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<serde_json::Value, SearchError> {
        info!("Serper video search: {}", query);
        self.query(VIDEOS_ENDPOINT, query, max_results).await
    }

    async fn search_images(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<serde_json::Value, SearchError> {
        info!("Serper image search: {}", query);
        self.query(IMAGES_ENDPOINT, query, max_results).await
    }
}
