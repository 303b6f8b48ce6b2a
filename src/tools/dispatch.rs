use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::config::SearchConfig;
use crate::search::jina::JinaReader;
use crate::search::tavily::TavilyClient;
use crate::search::serper::SerperClient;
use crate::search::{
    ExtractProvider, MediaSearchProvider, SearchParams, SearchProvider, SearchResult,
    SearchResults,
};
use crate::tools::parser::CoercedToolCall;
use crate::tools::registry::ToolRegistry;

/// The outcome of one tool invocation. `result` always has the shape a
/// successful call with zero items would have, so consumers never need an
/// "absent" branch.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub tool_name: String,
    pub parameters: serde_json::Value,
    pub result: serde_json::Value,
    pub succeeded: bool,
    pub error_message: Option<String>,
}

impl ToolOutcome {
    fn success(call: &CoercedToolCall, result: serde_json::Value) -> Self {
        Self {
            tool_name: call.tool_name.clone(),
            parameters: call.args_json(),
            result,
            succeeded: true,
            error_message: None,
        }
    }

    fn failure(call: &CoercedToolCall, result: serde_json::Value, message: String) -> Self {
        Self {
            tool_name: call.tool_name.clone(),
            parameters: call.args_json(),
            result,
            succeeded: false,
            error_message: Some(message),
        }
    }
}

/// Routes a coerced tool call to its backend capability. The single place
/// that knows the tool-name-to-backend mapping; `dispatch` is total and
/// converts every backend failure into a failure outcome.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: ToolRegistry,
    search: Arc<dyn SearchProvider>,
    extract: Arc<dyn ExtractProvider>,
    media: Arc<dyn MediaSearchProvider>,
}

impl ToolDispatcher {
    pub fn new(
        registry: ToolRegistry,
        search: Arc<dyn SearchProvider>,
        extract: Arc<dyn ExtractProvider>,
        media: Arc<dyn MediaSearchProvider>,
    ) -> Self {
        Self {
            registry,
            search,
            extract,
            media,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        let tavily = Arc::new(TavilyClient::new(config.tavily_api_key.clone()));

        // Jina takes over extraction when its key is configured.
        let extract: Arc<dyn ExtractProvider> = match &config.jina_api_key {
            Some(key) if !key.is_empty() => Arc::new(JinaReader::new(key.clone())),
            _ => tavily.clone(),
        };

        Self {
            registry: ToolRegistry::new(),
            search: tavily,
            extract,
            media: Arc::new(SerperClient::new(config.serper_api_key.clone())),
        }
    }

    pub async fn dispatch(&self, call: &CoercedToolCall) -> ToolOutcome {
        match call.tool_name.as_str() {
            "search" => self.dispatch_search(call).await,
            "extract_url" => self.dispatch_extract(call).await,
            "search_videos" => self.dispatch_media(call, true).await,
            "search_images" => self.dispatch_media(call, false).await,
            other => ToolOutcome::failure(
                call,
                json!({ "error": "unknown tool", "tool": other }),
                format!("unknown tool '{}'", other),
            ),
        }
    }

    async fn dispatch_search(&self, call: &CoercedToolCall) -> ToolOutcome {
        let query = string_param(call, "query");
        if query.is_empty() {
            return ToolOutcome::failure(
                call,
                results_json(&SearchResults::empty("")),
                "search requires a non-empty query".to_string(),
            );
        }

        let params = SearchParams {
            query: query.clone(),
            max_results: self.clamped_count(call, "max_results"),
            search_depth: call
                .get("search_depth")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            include_domains: list_param(call, "include_domains"),
            exclude_domains: list_param(call, "exclude_domains"),
        };

        match self.search.search(params).await {
            Ok(results) => ToolOutcome::success(call, results_json(&results)),
            Err(e) => {
                warn!("Search execution error: {}", e);
                ToolOutcome::failure(call, results_json(&SearchResults::empty(query)), e.to_string())
            }
        }
    }

    async fn dispatch_extract(&self, call: &CoercedToolCall) -> ToolOutcome {
        let url = string_param(call, "url");

        // Reject before any network attempt; the error is carried as data.
        if reqwest::Url::parse(&url).is_err() {
            let mut results = SearchResults::empty(url.clone());
            results.error = Some("Invalid URL format".to_string());
            return ToolOutcome::failure(call, results_json(&results), "Invalid URL format".to_string());
        }

        match self.extract.extract(&url).await {
            Ok(results) => ToolOutcome::success(call, results_json(&results)),
            Err(e) => {
                warn!("URL extraction error: {}", e);
                ToolOutcome::failure(call, results_json(&extraction_fallback(&url)), e.to_string())
            }
        }
    }

    async fn dispatch_media(&self, call: &CoercedToolCall, videos: bool) -> ToolOutcome {
        let query = string_param(call, "query");
        let empty_key = if videos { "videos" } else { "images" };
        let empty = json!({ empty_key: [], "query": query });

        if query.is_empty() {
            return ToolOutcome::failure(
                call,
                empty,
                format!("{} requires a non-empty query", call.tool_name),
            );
        }

        let max_results = self.clamped_count(call, "max_results").unwrap_or(5);
        let outcome = if videos {
            self.media.search_videos(&query, max_results).await
        } else {
            self.media.search_images(&query, max_results).await
        };

        match outcome {
            Ok(result) => ToolOutcome::success(call, result),
            Err(e) => {
                warn!("Media search error: {}", e);
                ToolOutcome::failure(call, empty, e.to_string())
            }
        }
    }

    /// Result count for the call, clamped into the range the descriptor
    /// declares. A malformed (non-numeric) value falls back to the declared
    /// default.
    fn clamped_count(&self, call: &CoercedToolCall, key: &str) -> Option<u32> {
        let spec = self
            .registry
            .describe(&call.tool_name)?
            .parameters
            .iter()
            .find(|p| p.key == key)?;

        let value = call
            .get(key)
            .and_then(|v| v.as_number())
            .or_else(|| spec.default.as_ref().and_then(|d| d.as_number()))?;

        let value = match (spec.min, spec.max) {
            (Some(min), Some(max)) => value.clamp(min, max),
            (Some(min), None) => value.max(min),
            (None, Some(max)) => value.min(max),
            (None, None) => value,
        };

        Some(value.round() as u32)
    }
}

fn string_param(call: &CoercedToolCall, key: &str) -> String {
    call.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn list_param(call: &CoercedToolCall, key: &str) -> Vec<String> {
    call.get(key)
        .and_then(|v| v.as_list())
        .map(|items| items.to_vec())
        .unwrap_or_default()
}

fn results_json(results: &SearchResults) -> serde_json::Value {
    serde_json::to_value(results).unwrap_or_else(|_| json!({}))
}

/// Explanatory payload when every extraction path failed, so the answering
/// model can tell the user what went wrong.
fn extraction_fallback(url: &str) -> SearchResults {
    SearchResults {
        results: vec![SearchResult {
            title: "URL Extraction Failed".to_string(),
            content: format!(
                "I was unable to extract content from {}. This could be due to:\n\
                 - The website blocking automated access\n\
                 - The URL being invalid\n\
                 - Network issues\n\n\
                 Please try another URL or check if the link is accessible.",
                url
            ),
            url: url.to_string(),
            score: 0.0,
            raw_content: None,
        }],
        query: url.to_string(),
        images: Vec::new(),
        number_of_results: 1,
        answers: None,
        error: None,
    }
}
