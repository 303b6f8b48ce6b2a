use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

use crate::search::{
    ExtractProvider, SearchError, SearchParams, SearchProvider, SearchResult, SearchResultImage,
    SearchResults, CONTENT_CHARACTER_LIMIT,
};

const SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";
const EXTRACT_ENDPOINT: &str = "https://api.tavily.com/extract";

// Tavily rejects queries shorter than this.
const MIN_QUERY_LENGTH: usize = 5;

pub struct TavilyClient {
    client: Client,
    api_key: String,
}

impl TavilyClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    async fn post_json(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, SearchError> {
        let response = self
            .client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(format!("Tavily Error {}: {}", status, text)));
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))
    }
}

/// Pads short queries with trailing spaces up to the backend minimum; the
/// semantic content is unchanged from the caller's point of view.
fn fill_query(query: &str) -> String {
    if query.len() < MIN_QUERY_LENGTH {
        format!("{}{}", query, " ".repeat(MIN_QUERY_LENGTH - query.len()))
    } else {
        query.to_string()
    }
}

fn sanitize_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => url.to_string(),
    }
}

fn parse_results(data: &serde_json::Value) -> Vec<SearchResult> {
    data["results"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| SearchResult {
                    title: item["title"].as_str().unwrap_or("").to_string(),
                    url: item["url"].as_str().unwrap_or("").to_string(),
                    content: item["content"].as_str().unwrap_or("").to_string(),
                    score: item["score"].as_f64().unwrap_or(0.0),
                    raw_content: item["raw_content"].as_str().map(|s| s.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Keeps only images that carry a description; their URLs are re-serialized
/// through the URL parser when possible.
fn parse_images(data: &serde_json::Value) -> Vec<SearchResultImage> {
    data["images"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let description = item["description"].as_str().unwrap_or("");
                    if description.is_empty() {
                        return None;
                    }
                    Some(SearchResultImage {
                        url: sanitize_url(item["url"].as_str().unwrap_or("")),
                        description: Some(description.to_string()),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search(&self, params: SearchParams) -> Result<SearchResults, SearchError> {
        let query = fill_query(&params.query);

        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": params.max_results.unwrap_or(10).max(5),
            "search_depth": params.search_depth.as_deref().unwrap_or("basic"),
            "include_images": true,
            "include_image_descriptions": true,
            "include_answers": true,
            "include_domains": params.include_domains,
            "exclude_domains": params.exclude_domains,
        });

        info!("Tavily search: {}", query);
        let data = self.post_json(SEARCH_ENDPOINT, &body).await?;

        let results = parse_results(&data);
        Ok(SearchResults {
            query: data["query"].as_str().unwrap_or(&query).to_string(),
            number_of_results: data["number_of_results"]
                .as_u64()
                .map(|n| n as usize)
                .unwrap_or(results.len()),
            results,
            images: parse_images(&data),
            answers: data["answer"].as_str().map(|a| vec![a.to_string()]),
            error: None,
        })
    }
}

#[async_trait]
impl ExtractProvider for TavilyClient {
    async fn extract(&self, url: &str) -> Result<SearchResults, SearchError> {
        let body = json!({
            "api_key": self.api_key,
            "urls": [url],
            "include_raw_content": true,
        });

        info!("Tavily extract: {}", url);
        let data = self.post_json(EXTRACT_ENDPOINT, &body).await?;

        let result = data["results"]
            .as_array()
            .and_then(|r| r.first())
            .ok_or(SearchError::NoContent)?;

        let content: String = result["raw_content"]
            .as_str()
            .or_else(|| result["content"].as_str())
            .unwrap_or("")
            .chars()
            .take(CONTENT_CHARACTER_LIMIT)
            .collect();

        let title = match result["title"].as_str() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => content.chars().take(100).collect::<String>(),
        };

        Ok(SearchResults {
            results: vec![SearchResult {
                title: if title.is_empty() { "Untitled".to_string() } else { title },
                content: if content.is_empty() {
                    "No content extracted".to_string()
                } else {
                    content
                },
                url: result["url"].as_str().unwrap_or(url).to_string(),
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
