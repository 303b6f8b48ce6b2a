pub mod dispatch;
pub mod parser;
pub mod prompt;
pub mod registry;

pub use dispatch::{ToolDispatcher, ToolOutcome};
pub use parser::{coerce, parse_tool_call, CoercedToolCall, RawToolCall};
pub use registry::{ParamKind, ParamValue, ParameterSpec, ToolDescriptor, ToolRegistry};
