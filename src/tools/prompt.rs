use crate::tools::registry::{ParamValue, ParameterSpec, ToolRegistry};

/// The reply the model must produce when no tool is appropriate.
pub const EMPTY_TOOL_SENTINEL: &str = "</tool_call><tool></tool></tool_call>";

/// Renders the registry into the tool-selection system prompt: one
/// parameter listing and one worked tagged-text example per tool, then the
/// empty-tool sentinel instruction. Deterministic for a given registry and
/// date.
pub fn instruction_block(registry: &ToolRegistry, today: &str) -> String {
    let mut out = String::new();

    out.push_str("You are an intelligent assistant that analyzes conversations to select the most appropriate tools and their parameters.\n");
    out.push_str("You excel at understanding context to determine when and how to use available tools, including crafting effective search queries.\n");
    out.push_str(&format!("Current date: {}\n\n", today));

    out.push_str("Do not include any other text in your response.\n");
    out.push_str("Respond in XML format with the following structure:\n");
    out.push_str("<tool_call>\n  <tool>tool_name</tool>\n  <parameters>\n    <param_name>value</param_name>\n  </parameters>\n</tool_call>\n\n");

    let names: Vec<&str> = registry.describe_all().iter().map(|t| t.name).collect();
    out.push_str(&format!("Available tools: {}\n", names.join(", ")));

    for tool in registry.describe_all() {
        out.push_str(&format!("\n{} parameters:\n", tool.name));
        for param in &tool.parameters {
            out.push_str(&describe_parameter(param));
            out.push('\n');
        }
        out.push_str("Example:\n");
        out.push_str(&worked_example(tool.name));
        out.push('\n');
    }

    out.push_str(&format!(
        "\nIf you don't need a tool, respond with {}\n",
        EMPTY_TOOL_SENTINEL
    ));

    out
}

fn describe_parameter(param: &ParameterSpec) -> String {
    let optional = if param.required { "" } else { " (optional)" };
    match &param.default {
        Some(ParamValue::Number(n)) => {
            format!("- {}{}: {} [default: {}]", param.key, optional, param.description, n)
        }
        Some(ParamValue::Text(t)) => {
            format!("- {}{}: {} [default: {}]", param.key, optional, param.description, t)
        }
        _ => format!("- {}{}: {}", param.key, optional, param.description),
    }
}

fn worked_example(tool: &str) -> String {
    let body = match tool {
        "search" => concat!(
            "    <query>latest developments in renewable energy</query>\n",
            "    <max_results>10</max_results>\n",
            "    <search_depth>basic</search_depth>\n",
            "    <include_domains>reuters.com,bbc.com</include_domains>\n",
            "    <exclude_domains>pinterest.com</exclude_domains>\n",
        ),
        "extract_url" => "    <url>https://example.com/article</url>\n",
        "search_videos" => concat!(
            "    <query>how to solder electronics</query>\n",
            "    <max_results>5</max_results>\n",
        ),
        "search_images" => concat!(
            "    <query>aurora borealis over Iceland</query>\n",
            "    <max_results>5</max_results>\n",
        ),
        _ => "",
    };

    format!(
        "<tool_call>\n  <tool>{}</tool>\n  <parameters>\n{}  </parameters>\n</tool_call>\n",
        tool, body
    )
}
