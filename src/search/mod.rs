pub mod jina;
pub mod serper;
pub mod tavily;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard cap on extracted page content, matching the search backends'
/// practical context limits.
pub const CONTENT_CHARACTER_LIMIT: usize = 10_000;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("No content found")]
    NoContent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The normalized result shape shared by the search and extract
/// capabilities. A failed or empty call is an empty `results` list with the
/// original query, never an absent value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub images: Vec<SearchResultImage>,
    pub number_of_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResults {
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            images: Vec::new(),
            number_of_results: 0,
            answers: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub max_results: Option<u32>,
    pub search_depth: Option<String>,
    pub include_domains: Vec<String>,
    pub exclude_domains: Vec<String>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, params: SearchParams) -> Result<SearchResults, SearchError>;
}

#[async_trait]
pub trait ExtractProvider: Send + Sync {
    async fn extract(&self, url: &str) -> Result<SearchResults, SearchError>;
}

#[async_trait]
pub trait MediaSearchProvider: Send + Sync {
    async fn search_videos(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<serde_json::Value, SearchError>;

    async fn search_images(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<serde_json::Value, SearchError>;
}
