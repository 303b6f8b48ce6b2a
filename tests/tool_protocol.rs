#[cfg(test)]
mod tests {
    use scout::tools::prompt::{instruction_block, EMPTY_TOOL_SENTINEL};
    use scout::tools::{coerce, parse_tool_call, ParamValue, ToolRegistry};

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
    }

    #[test]
    fn registry_keys_are_protocol_safe_and_unique() {
        let registry = registry();
        let mut tool_names = Vec::new();

        for tool in registry.describe_all() {
            tool_names.push(tool.name);
            let mut keys = Vec::new();
            for param in &tool.parameters {
                assert!(
                    !param.key.contains(|c: char| c.is_whitespace()),
                    "key '{}' contains whitespace",
                    param.key
                );
                assert!(!param.key.contains('<') && !param.key.contains('>'));
                assert!(!keys.contains(&param.key), "duplicate key '{}'", param.key);
                keys.push(param.key);
            }
        }

        let mut unique = tool_names.clone();
        unique.dedup();
        assert_eq!(tool_names, unique);
    }

    #[test]
    fn instruction_block_lists_every_tool_with_example_and_sentinel() {
        let registry = registry();
        let block = instruction_block(&registry, "2026-08-30");

        assert!(block.contains("Available tools: search, extract_url, search_videos, search_images"));
        assert!(block.contains("Current date: 2026-08-30"));
        assert!(block.contains(EMPTY_TOOL_SENTINEL));
        for tool in registry.describe_all() {
            assert!(block.contains(&format!("<tool>{}</tool>", tool.name)));
            for param in &tool.parameters {
                assert!(block.contains(param.key), "missing parameter {}", param.key);
            }
        }
    }

    #[test]
    fn text_without_call_boundary_parses_to_none() {
        let registry = registry();
        assert!(parse_tool_call("I can answer that directly.", &registry).is_none());
        assert!(parse_tool_call("", &registry).is_none());
    }

    #[test]
    fn empty_tool_tag_is_the_no_tool_signal() {
        let registry = registry();
        assert!(parse_tool_call("<tool_call><tool></tool></tool_call>", &registry).is_none());
        // The sentinel form has no opening boundary at all.
        assert!(parse_tool_call("</tool_call><tool></tool></tool_call>", &registry).is_none());
    }

    #[test]
    fn surrounding_prose_is_discarded() {
        let registry = registry();
        let text = "Sure, let me look that up!\n<tool_call><tool>search</tool><parameters><query>rust 2024 edition</query></parameters></tool_call>\nDone.";
        let raw = parse_tool_call(text, &registry).unwrap();
        assert_eq!(raw.tool_name, "search");
        assert_eq!(raw.raw_fields["query"], "rust 2024 edition");
    }

    #[test]
    fn missing_closing_marker_is_tolerated() {
        let registry = registry();
        let text = "<tool_call><tool>search</tool><parameters><query>weather berlin</query></parameters>";
        let raw = parse_tool_call(text, &registry).unwrap();
        assert_eq!(raw.raw_fields["query"], "weather berlin");
    }

    #[test]
    fn tags_match_case_insensitively() {
        let registry = registry();
        let text = "<tool_call><TOOL>search</TOOL><Parameters><QUERY>solar flares</QUERY></Parameters></tool_call>";
        let raw = parse_tool_call(text, &registry).unwrap();
        assert_eq!(raw.tool_name, "search");
        assert_eq!(raw.raw_fields["query"], "solar flares");
    }

    #[test]
    fn repeated_parameter_tags_keep_the_first_match() {
        let registry = registry();
        let text = "<tool_call><tool>search</tool><parameters><query>first</query><query>second</query></parameters></tool_call>";
        let raw = parse_tool_call(text, &registry).unwrap();
        assert_eq!(raw.raw_fields["query"], "first");
    }

    #[test]
    fn unknown_tool_keeps_its_name_with_no_fields() {
        let registry = registry();
        let text = "<tool_call><tool>teleport</tool><parameters><destination>mars</destination></parameters></tool_call>";
        let raw = parse_tool_call(text, &registry).unwrap();
        assert_eq!(raw.tool_name, "teleport");
        assert!(raw.raw_fields.is_empty());

        let call = coerce(&registry, &raw);
        assert_eq!(call.tool_name, "teleport");
        assert!(call.parameters.is_empty());
    }

    #[test]
    fn coercion_fills_declared_defaults() {
        let registry = registry();
        let text = "<tool_call><tool>search</tool><parameters><query>ai news</query></parameters></tool_call>";
        let raw = parse_tool_call(text, &registry).unwrap();
        let call = coerce(&registry, &raw);

        assert_eq!(call.get("query"), Some(&ParamValue::Text("ai news".to_string())));
        assert_eq!(call.get("max_results"), Some(&ParamValue::Number(10.0)));
        assert_eq!(call.get("search_depth"), Some(&ParamValue::Text("basic".to_string())));
        // No default declared for the domain lists; they are simply absent.
        assert!(call.get("include_domains").is_none());
        assert!(call.get("exclude_domains").is_none());
    }

    #[test]
    fn non_numeric_number_field_keeps_the_original_string() {
        let registry = registry();
        let text = "<tool_call><tool>search</tool><parameters><query>ai news</query><max_results>a lot</max_results></parameters></tool_call>";
        let raw = parse_tool_call(text, &registry).unwrap();
        let call = coerce(&registry, &raw);
        assert_eq!(call.get("max_results"), Some(&ParamValue::Text("a lot".to_string())));
    }

    #[test]
    fn empty_list_field_coerces_to_zero_elements() {
        let registry = registry();
        let text = "<tool_call><tool>search</tool><parameters><query>ai news</query><include_domains></include_domains></parameters></tool_call>";
        let raw = parse_tool_call(text, &registry).unwrap();
        let call = coerce(&registry, &raw);
        assert_eq!(call.get("include_domains"), Some(&ParamValue::List(Vec::new())));
    }

    #[test]
    fn list_fields_split_on_commas_and_trim() {
        let registry = registry();
        let text = "<tool_call><tool>search</tool><parameters><query>ai news</query><exclude_domains>pinterest.com , quora.com</exclude_domains></parameters></tool_call>";
        let raw = parse_tool_call(text, &registry).unwrap();
        let call = coerce(&registry, &raw);
        assert_eq!(
            call.get("exclude_domains"),
            Some(&ParamValue::List(vec![
                "pinterest.com".to_string(),
                "quora.com".to_string()
            ]))
        );
    }

    #[test]
    fn round_trip_preserves_every_declared_kind() {
        let registry = registry();
        let text = "<tool_call>\n  <tool>search</tool>\n  <parameters>\n    <query>quantum computing breakthroughs</query>\n    <max_results>15</max_results>\n    <search_depth>advanced</search_depth>\n    <include_domains>nature.com,arxiv.org</include_domains>\n    <exclude_domains>reddit.com</exclude_domains>\n  </parameters>\n</tool_call>";

        let raw = parse_tool_call(text, &registry).unwrap();
        let call = coerce(&registry, &raw);

        assert_eq!(call.tool_name, "search");
        assert_eq!(
            call.get("query"),
            Some(&ParamValue::Text("quantum computing breakthroughs".to_string()))
        );
        assert_eq!(call.get("max_results"), Some(&ParamValue::Number(15.0)));
        assert_eq!(call.get("search_depth"), Some(&ParamValue::Text("advanced".to_string())));
        assert_eq!(
            call.get("include_domains"),
            Some(&ParamValue::List(vec!["nature.com".to_string(), "arxiv.org".to_string()]))
        );
        assert_eq!(
            call.get("exclude_domains"),
            Some(&ParamValue::List(vec!["reddit.com".to_string()]))
        );
    }

    #[test]
    fn worked_examples_from_the_prompt_parse_back() {
        // Every example the encoder shows the model must survive its own
        // parser.
        let registry = registry();
        let block = instruction_block(&registry, "2026-08-30");

        for tool in registry.describe_all() {
            let marker = format!("<tool>{}</tool>", tool.name);
            let start = block.find(&marker).unwrap();
            let example_start = block[..start].rfind("<tool_call>").unwrap();
            let example_end = block[start..].find("</tool_call>").unwrap() + start;
            let example = &block[example_start..example_end + "</tool_call>".len()];

            let raw = parse_tool_call(example, &registry)
                .unwrap_or_else(|| panic!("example for {} did not parse", tool.name));
            assert_eq!(raw.tool_name, tool.name);
        }
    }
}
