use serde::Deserialize;

use crate::llm::models::Message;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
}
