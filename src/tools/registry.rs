use serde::Serialize;

/// The primitive kinds a tool parameter can take over the tagged-text
/// protocol. Everything arrives as tag-body text; the kind decides how the
/// raw string is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    Number,
    List,
}

/// A coerced parameter value. Serializes untagged so event payloads carry
/// plain JSON strings, numbers and arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Number(f64),
    List(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// Protocol tag name. Must contain no whitespace or angle brackets.
    pub key: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub default: Option<ParamValue>,
    /// Accepted range for number kinds; the dispatcher clamps into it.
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub description: &'static str,
}

impl ParameterSpec {
    fn text(key: &'static str, required: bool, description: &'static str) -> Self {
        Self {
            key,
            kind: ParamKind::Text,
            required,
            default: None,
            min: None,
            max: None,
            description,
        }
    }

    fn number(
        key: &'static str,
        default: f64,
        min: f64,
        max: f64,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            kind: ParamKind::Number,
            required: false,
            default: Some(ParamValue::Number(default)),
            min: Some(min),
            max: Some(max),
            description,
        }
    }

    fn list(key: &'static str, description: &'static str) -> Self {
        Self {
            key,
            kind: ParamKind::List,
            required: false,
            default: None,
            min: None,
            max: None,
            description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

/// Immutable set of tool schemas, built once at startup and shared
/// read-only across requests.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: vec![
                ToolDescriptor {
                    name: "search",
                    parameters: vec![
                        ParameterSpec::text("query", true, "The search query"),
                        ParameterSpec::number(
                            "max_results",
                            10.0,
                            5.0,
                            20.0,
                            "Maximum number of results to return (5-20)",
                        ),
                        ParameterSpec {
                            key: "search_depth",
                            kind: ParamKind::Text,
                            required: false,
                            default: Some(ParamValue::Text("basic".to_string())),
                            min: None,
                            max: None,
                            description: "Search depth: basic or advanced",
                        },
                        ParameterSpec::list(
                            "include_domains",
                            "List of domains to include in search",
                        ),
                        ParameterSpec::list(
                            "exclude_domains",
                            "List of domains to exclude from search",
                        ),
                    ],
                },
                ToolDescriptor {
                    name: "extract_url",
                    parameters: vec![ParameterSpec::text(
                        "url",
                        true,
                        "The URL to extract content from",
                    )],
                },
                ToolDescriptor {
                    name: "search_videos",
                    parameters: vec![
                        ParameterSpec::text("query", true, "The video search query"),
                        ParameterSpec::number(
                            "max_results",
                            5.0,
                            1.0,
                            10.0,
                            "Maximum number of videos to return (1-10)",
                        ),
                    ],
                },
                ToolDescriptor {
                    name: "search_images",
                    parameters: vec![
                        ParameterSpec::text("query", true, "The image search query"),
                        ParameterSpec::number(
                            "max_results",
                            5.0,
                            1.0,
                            10.0,
                            "Maximum number of images to return (1-10)",
                        ),
                    ],
                },
            ],
        }
    }

    pub fn describe(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn describe_all(&self) -> &[ToolDescriptor] {
        &self.tools
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
