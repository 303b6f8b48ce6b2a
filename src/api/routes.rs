use actix_web::{post, web, HttpResponse, Result as WebResult};
use bytes::Bytes;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::error;

use crate::api::models::ChatRequest;
use crate::chat::{answer_system_prompt, today, ChatEvent, TurnOrchestrator};
use crate::config::AppConfig;
use crate::llm::models::ChatOptions;

/// One chat turn over an event stream: at most one tool-call/tool-result
/// event pair, then the final answer as `chunk` frames, then `done`.
#[post("/api/chat")]
pub async fn chat(
    config: web::Data<AppConfig>,
    orchestrator: web::Data<TurnOrchestrator>,
    req: web::Json<ChatRequest>,
) -> WebResult<HttpResponse> {
    let req = req.into_inner();
    let orchestrator = orchestrator.into_inner();
    let system_prompt = config
        .chat
        .system_prompt
        .clone()
        .unwrap_or_else(|| answer_system_prompt(&today()));

    // Frames are fully serialized before they enter the channel so the
    // response stream only has to wrap them in SSE framing.
    let (tx, mut rx) = mpsc::channel::<String>(64);

    tokio::spawn(async move {
        let mut messages = req.messages;

        // Tool decision + dispatch; protocol events forward to the client
        // in emission order before any answer chunk.
        let (ev_tx, mut ev_rx) = mpsc::channel::<ChatEvent>(16);
        let event_tx = tx.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(event) = ev_rx.recv().await {
                if let Ok(payload) = serde_json::to_string(&event) {
                    let _ = event_tx.send(payload).await;
                }
            }
        });

        let turn = orchestrator.run_turn(&messages, ev_tx).await;
        let _ = forwarder.await;

        let follow_up = match turn {
            Ok(follow_up) => follow_up,
            Err(e) => {
                error!("Tool decision failed: {}", e);
                let _ = tx
                    .send(json!({ "type": "error", "content": e.to_string() }).to_string())
                    .await;
                return;
            }
        };
        messages.extend(follow_up);

        let options = ChatOptions {
            model: req.model,
            temperature: Some(0.7),
            system_prompt: Some(system_prompt),
            ..Default::default()
        };

        let (chunk_tx, mut chunk_rx) = mpsc::channel::<String>(100);
        let llm = orchestrator.llm().clone();
        tokio::spawn(async move {
            if let Err(e) = llm.chat_streaming(&messages, options, chunk_tx).await {
                error!("Answer streaming error: {:?}", e);
            }
        });

        while let Some(chunk) = chunk_rx.recv().await {
            let _ = tx
                .send(json!({ "type": "chunk", "content": chunk }).to_string())
                .await;
        }

        let _ = tx.send(json!({ "type": "done" }).to_string()).await;
    });

    let stream = async_stream::stream! {
        while let Some(payload) = rx.recv().await {
            yield Ok::<Bytes, actix_web::Error>(Bytes::from(format!("data: {}\n\n", payload)));
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .streaming(stream))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(chat);
}
