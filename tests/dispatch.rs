#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use scout::search::{
        ExtractProvider, MediaSearchProvider, SearchError, SearchParams, SearchProvider,
        SearchResults,
    };
    use scout::tools::{coerce, parse_tool_call, CoercedToolCall, ToolDispatcher, ToolRegistry};

    /// Records the parameters it was called with and returns zero results.
    struct RecordingSearch {
        captured: Mutex<Option<SearchParams>>,
        fail: bool,
    }

    impl RecordingSearch {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                captured: Mutex::new(None),
                fail,
            })
        }
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        async fn search(&self, params: SearchParams) -> Result<SearchResults, SearchError> {
            let query = params.query.clone();
            *self.captured.lock().unwrap() = Some(params);
            if self.fail {
                return Err(SearchError::Api("boom".to_string()));
            }
            Ok(SearchResults::empty(query))
        }
    }

    /// A backend that must never be reached.
    struct UnreachableExtract;

    #[async_trait]
    impl ExtractProvider for UnreachableExtract {
        async fn extract(&self, url: &str) -> Result<SearchResults, SearchError> {
            panic!("extract backend called for {}", url);
        }
    }

    struct StubExtract {
        fail: bool,
    }

    #[async_trait]
    impl ExtractProvider for StubExtract {
        async fn extract(&self, url: &str) -> Result<SearchResults, SearchError> {
            if self.fail {
                return Err(SearchError::NoContent);
            }
            Ok(SearchResults::empty(url))
        }
    }

    struct StubMedia {
        fail: bool,
    }

    #[async_trait]
    impl MediaSearchProvider for StubMedia {
        async fn search_videos(
            &self,
            query: &str,
            max_results: u32,
        ) -> Result<serde_json::Value, SearchError> {
            if self.fail {
                return Err(SearchError::Network("down".to_string()));
            }
            Ok(serde_json::json!({ "videos": [], "query": query, "requested": max_results }))
        }

        async fn search_images(
            &self,
            query: &str,
            max_results: u32,
        ) -> Result<serde_json::Value, SearchError> {
            if self.fail {
                return Err(SearchError::Network("down".to_string()));
            }
            Ok(serde_json::json!({ "images": [], "query": query, "requested": max_results }))
        }
    }

    fn dispatcher(
        search: Arc<dyn SearchProvider>,
        extract: Arc<dyn ExtractProvider>,
        media: Arc<dyn MediaSearchProvider>,
    ) -> ToolDispatcher {
        ToolDispatcher::new(ToolRegistry::new(), search, extract, media)
    }

    fn call_from(xml: &str) -> CoercedToolCall {
        let registry = ToolRegistry::new();
        let raw = parse_tool_call(xml, &registry).expect("call should parse");
        coerce(&registry, &raw)
    }

    #[tokio::test]
    async fn unknown_tool_yields_a_structured_failure() {
        let d = dispatcher(
            RecordingSearch::new(false),
            Arc::new(UnreachableExtract),
            Arc::new(StubMedia { fail: false }),
        );
        let call = call_from("<tool_call><tool>teleport</tool></tool_call>");

        let outcome = d.dispatch(&call).await;
        assert!(!outcome.succeeded);
        assert!(outcome.error_message.unwrap().contains("unknown tool"));
        assert_eq!(outcome.result["error"], "unknown tool");
        assert_eq!(outcome.result["tool"], "teleport");
    }

    #[tokio::test]
    async fn invalid_url_short_circuits_before_the_backend() {
        let d = dispatcher(
            RecordingSearch::new(false),
            Arc::new(UnreachableExtract),
            Arc::new(StubMedia { fail: false }),
        );
        let call = call_from(
            "<tool_call><tool>extract_url</tool><parameters><url>not a url</url></parameters></tool_call>",
        );

        let outcome = d.dispatch(&call).await;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.result["error"], "Invalid URL format");
        assert_eq!(outcome.result["number_of_results"], 0);
        assert_eq!(outcome.result["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn extract_failure_returns_an_explanatory_fallback() {
        let d = dispatcher(
            RecordingSearch::new(false),
            Arc::new(StubExtract { fail: true }),
            Arc::new(StubMedia { fail: false }),
        );
        let call = call_from(
            "<tool_call><tool>extract_url</tool><parameters><url>https://example.com/page</url></parameters></tool_call>",
        );

        let outcome = d.dispatch(&call).await;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.result["number_of_results"], 1);
        assert_eq!(outcome.result["results"][0]["title"], "URL Extraction Failed");
    }

    #[tokio::test]
    async fn search_max_results_is_clamped_into_the_declared_range() {
        for (given, expected) in [("100", 20u32), ("1", 5), ("", 10)] {
            let search = RecordingSearch::new(false);
            let d = dispatcher(
                search.clone(),
                Arc::new(UnreachableExtract),
                Arc::new(StubMedia { fail: false }),
            );

            let xml = if given.is_empty() {
                "<tool_call><tool>search</tool><parameters><query>rust async</query></parameters></tool_call>".to_string()
            } else {
                format!(
                    "<tool_call><tool>search</tool><parameters><query>rust async</query><max_results>{}</max_results></parameters></tool_call>",
                    given
                )
            };
            let outcome = d.dispatch(&call_from(&xml)).await;
            assert!(outcome.succeeded);

            let params = search.captured.lock().unwrap().clone().unwrap();
            assert_eq!(params.max_results, Some(expected), "given '{}'", given);
        }
    }

    #[tokio::test]
    async fn malformed_max_results_falls_back_to_the_default() {
        let search = RecordingSearch::new(false);
        let d = dispatcher(
            search.clone(),
            Arc::new(UnreachableExtract),
            Arc::new(StubMedia { fail: false }),
        );
        let call = call_from(
            "<tool_call><tool>search</tool><parameters><query>rust async</query><max_results>plenty</max_results></parameters></tool_call>",
        );

        let outcome = d.dispatch(&call).await;
        assert!(outcome.succeeded);
        // The malformed value is still visible in the announced parameters.
        assert_eq!(outcome.parameters["max_results"], "plenty");

        let params = search.captured.lock().unwrap().clone().unwrap();
        assert_eq!(params.max_results, Some(10));
    }

    #[tokio::test]
    async fn empty_search_query_fails_without_a_backend_call() {
        struct UnreachableSearch;

        #[async_trait]
        impl SearchProvider for UnreachableSearch {
            async fn search(&self, _: SearchParams) -> Result<SearchResults, SearchError> {
                panic!("search backend called with an empty query");
            }
        }

        let d = dispatcher(
            Arc::new(UnreachableSearch),
            Arc::new(UnreachableExtract),
            Arc::new(StubMedia { fail: false }),
        );
        let call = call_from(
            "<tool_call><tool>search</tool><parameters><query></query></parameters></tool_call>",
        );

        let outcome = d.dispatch(&call).await;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.result["number_of_results"], 0);
    }

    #[tokio::test]
    async fn search_backend_failure_converts_to_empty_results() {
        let search = RecordingSearch::new(true);
        let d = dispatcher(
            search,
            Arc::new(UnreachableExtract),
            Arc::new(StubMedia { fail: false }),
        );
        let call = call_from(
            "<tool_call><tool>search</tool><parameters><query>kernel news</query></parameters></tool_call>",
        );

        let outcome = d.dispatch(&call).await;
        assert!(!outcome.succeeded);
        assert!(outcome.error_message.is_some());
        assert_eq!(outcome.result["query"], "kernel news");
        assert_eq!(outcome.result["number_of_results"], 0);
        assert_eq!(outcome.result["results"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn video_search_defaults_and_clamps_the_count() {
        let d = dispatcher(
            RecordingSearch::new(false),
            Arc::new(UnreachableExtract),
            Arc::new(StubMedia { fail: false }),
        );

        let call = call_from(
            "<tool_call><tool>search_videos</tool><parameters><query>rocket launch</query></parameters></tool_call>",
        );
        let outcome = d.dispatch(&call).await;
        assert!(outcome.succeeded);
        assert_eq!(outcome.result["requested"], 5);

        let call = call_from(
            "<tool_call><tool>search_videos</tool><parameters><query>rocket launch</query><max_results>99</max_results></parameters></tool_call>",
        );
        let outcome = d.dispatch(&call).await;
        assert_eq!(outcome.result["requested"], 10);
    }

    #[tokio::test]
    async fn media_failure_keeps_the_tool_shaped_empty_result() {
        let d = dispatcher(
            RecordingSearch::new(false),
            Arc::new(UnreachableExtract),
            Arc::new(StubMedia { fail: true }),
        );
        let call = call_from(
            "<tool_call><tool>search_images</tool><parameters><query>red pandas</query></parameters></tool_call>",
        );

        let outcome = d.dispatch(&call).await;
        assert!(!outcome.succeeded);
        assert_eq!(outcome.result["images"].as_array().unwrap().len(), 0);
        assert_eq!(outcome.result["query"], "red pandas");
    }
}
