use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::search::{
    ExtractProvider, SearchError, SearchResult, SearchResults, CONTENT_CHARACTER_LIMIT,
};

const READER_BASE: &str = "https://r.jina.ai";

/// URL extraction through the Jina Reader API. Preferred over Tavily
/// extraction when a Jina key is configured.
pub struct JinaReader {
    client: Client,
    api_key: String,
}

impl JinaReader {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl ExtractProvider for JinaReader {
    async fn extract(&self, url: &str) -> Result<SearchResults, SearchError> {
        info!("Jina extract: {}", url);

        let mut request = self
            .client
            .get(format!("{}/{}", READER_BASE, url))
            .header("Accept", "application/json")
            .header("X-With-Generated-Alt", "true");
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(format!("Jina Error {}: {}", status, text)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let content = match json["data"]["content"].as_str() {
            Some(c) if !c.is_empty() => c.chars().take(CONTENT_CHARACTER_LIMIT).collect::<String>(),
            _ => return Err(SearchError::NoContent),
        };

        Ok(SearchResults {
            results: vec![SearchResult {
                title: json["data"]["title"].as_str().unwrap_or("Untitled").to_string(),
                content,
                url: json["data"]["url"].as_str().unwrap_or(url).to_string(),
                score: 1.0,
                raw_content: None,
            }],
            query: url.to_string(),
            images: Vec::new(),
            number_of_results: 1,
            answers: None,
            error: None,
        })
    }
}
