use regex::Regex;
use std::collections::HashMap;

use crate::tools::registry::{ParamKind, ParamValue, ToolRegistry};

const OPEN_MARKER: &str = "<tool_call>";
const CLOSE_MARKER: &str = "</tool_call>";

/// A tool call as recovered from the model's reply, before any typing.
/// Field values are the literal trimmed tag bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToolCall {
    pub tool_name: String,
    pub raw_fields: HashMap<String, String>,
}

/// A tool call with parameters coerced to their declared kinds, in the
/// descriptor's declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedToolCall {
    pub tool_name: String,
    pub parameters: Vec<(String, ParamValue)>,
}

impl CoercedToolCall {
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.parameters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Parameters as a JSON object, the shape carried by protocol events.
    pub fn args_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, value) in &self.parameters {
            map.insert(key.clone(), serde_json::to_value(value).unwrap_or_default());
        }
        serde_json::Value::Object(map)
    }
}

/// Recovers a tool call from the model's raw reply.
///
/// Returns `None` when no call boundary is present or the tool-name tag is
/// empty or missing; both are the model's "no tool" signal and are not
/// distinguishable here. A tool name absent from the registry still yields
/// a call (with no fields) so the dispatcher can report it instead of the
/// drift being silently dropped.
///
/// Never fails: malformed input degrades to `None`.
pub fn parse_tool_call(text: &str, registry: &ToolRegistry) -> Option<RawToolCall> {
    // Everything before the first opening marker and after the last closing
    // marker is discarded. A missing closing marker keeps the rest of the
    // text; the sentinel reply has no opening marker at all and falls out
    // here.
    let open = text.find(OPEN_MARKER)?;
    let span = &text[open + OPEN_MARKER.len()..];
    let span = match span.rfind(CLOSE_MARKER) {
        Some(close) => &span[..close],
        None => span,
    };
    let span = span.trim();
    if span.is_empty() {
        return None;
    }

    let tool_name = tag_body(span, "tool")?;
    if tool_name.is_empty() {
        return None;
    }

    let descriptor = match registry.describe(&tool_name) {
        Some(d) => d,
        None => {
            // Unknown tool: keep the name, skip field extraction.
            return Some(RawToolCall {
                tool_name,
                raw_fields: HashMap::new(),
            });
        }
    };

    let mut raw_fields = HashMap::new();
    if let Some(params_section) = section_body(span, "parameters") {
        for spec in &descriptor.parameters {
            if let Some(value) = tag_body(&params_section, spec.key) {
                raw_fields.insert(spec.key.to_string(), value);
            }
        }
    }

    Some(RawToolCall {
        tool_name,
        raw_fields,
    })
}

/// First match of `<tag>...</tag>` where the body contains no further tags.
/// Case-insensitive; repeated tags beyond the first are ignored.
fn tag_body(text: &str, tag: &str) -> Option<String> {
    let escaped = regex::escape(tag);
    let re = Regex::new(&format!(r"(?i)<{escaped}>([^<]*)</{escaped}>")).ok()?;
    re.captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// First match of a container tag whose body may hold nested tags.
fn section_body(text: &str, tag: &str) -> Option<String> {
    let escaped = regex::escape(tag);
    let re = Regex::new(&format!(r"(?is)<{escaped}>(.*?)</{escaped}>")).ok()?;
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Coerces raw string fields into the kinds declared for the tool. Missing
/// fields take their declared default or are omitted; an unknown tool name
/// passes through with no parameters. Coercion never fails: a number that
/// does not parse keeps its original string so the backend rejects it
/// loudly instead of the value being lost here.
pub fn coerce(registry: &ToolRegistry, raw: &RawToolCall) -> CoercedToolCall {
    let descriptor = match registry.describe(&raw.tool_name) {
        Some(d) => d,
        None => {
            return CoercedToolCall {
                tool_name: raw.tool_name.clone(),
                parameters: Vec::new(),
            }
        }
    };

    let mut parameters = Vec::new();
    for spec in &descriptor.parameters {
        if let Some(raw_value) = raw.raw_fields.get(spec.key) {
            parameters.push((spec.key.to_string(), coerce_value(spec.kind, raw_value)));
        } else if let Some(default) = &spec.default {
            parameters.push((spec.key.to_string(), default.clone()));
        }
    }

    CoercedToolCall {
        tool_name: raw.tool_name.clone(),
        parameters,
    }
}

fn coerce_value(kind: ParamKind, raw: &str) -> ParamValue {
    match kind {
        ParamKind::Text => ParamValue::Text(raw.to_string()),
        ParamKind::Number => match raw.parse::<f64>() {
            Ok(n) => ParamValue::Number(n),
            Err(_) => ParamValue::Text(raw.to_string()),
        },
        ParamKind::List => {
            if raw.is_empty() {
                ParamValue::List(Vec::new())
            } else {
                ParamValue::List(raw.split(',').map(|s| s.trim().to_string()).collect())
            }
        }
    }
}
