pub mod events;

pub use events::ChatEvent;

use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tracing::info;
use uuid::Uuid;

use crate::llm::models::{ChatOptions, Message};
use crate::llm::{LlmError, LlmProvider};
use crate::tools::{coerce, parse_tool_call, prompt, ToolDispatcher, ToolRegistry};

pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

/// System prompt for the final-answer completion call.
pub fn answer_system_prompt(today: &str) -> String {
    format!(
        "You are an intelligent AI assistant that can search the web to answer questions.\n\
         Current date: {}\n\n\
         Use the search results provided to answer the user's question accurately and comprehensively.\n\
         If no search results were provided, answer based on your general knowledge.\n\
         Always cite sources when using information from search results.",
        today
    )
}

/// Drives one assistant turn: asks the model for a tagged-text tool
/// decision, parses and dispatches it, streams the two protocol events, and
/// returns the synthetic messages to append before the final-answer call.
#[derive(Clone)]
pub struct TurnOrchestrator {
    llm: Arc<dyn LlmProvider>,
    dispatcher: ToolDispatcher,
    registry: ToolRegistry,
}

impl TurnOrchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>, dispatcher: ToolDispatcher) -> Self {
        Self {
            llm,
            dispatcher,
            registry: ToolRegistry::new(),
        }
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Runs the tool-decision step for one turn.
    ///
    /// Returns the synthetic follow-up messages (empty when no tool was
    /// chosen) for the final-answer call; they are never part of durable
    /// history. The decision call's own failure is the only error path; a
    /// failing tool is reported through the events and the messages.
    pub async fn run_turn(
        &self,
        messages: &[Message],
        events: Sender<ChatEvent>,
    ) -> Result<Vec<Message>, LlmError> {
        let options = ChatOptions {
            temperature: Some(0.3),
            system_prompt: Some(prompt::instruction_block(&self.registry, &today())),
            ..Default::default()
        };

        let decision = self.llm.chat(messages, options).await?;

        let raw = match parse_tool_call(&decision.content, &self.registry) {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        let call = coerce(&self.registry, &raw);

        info!("Tool selected: {} {}", call.tool_name, call.args_json());

        let tool_call_id = format!("call_{}", Uuid::new_v4().simple());
        let args = call.args_json();

        let _ = events
            .send(ChatEvent::ToolCall {
                tool_call_id: tool_call_id.clone(),
                tool_name: call.tool_name.clone(),
                args: args.clone(),
            })
            .await;

        let outcome = self.dispatcher.dispatch(&call).await;

        let _ = events
            .send(ChatEvent::ToolResult {
                tool_call_id,
                tool_name: outcome.tool_name.clone(),
                args,
                result: outcome.result.clone(),
            })
            .await;

        Ok(vec![
            Message::assistant(format!("Tool call result: {}", outcome.result)),
            Message::user("Now answer the user question using the search results above."),
        ])
    }
}
