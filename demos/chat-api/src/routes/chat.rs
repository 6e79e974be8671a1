use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use deckwright::{TurnReply, TurnRequest};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(rename = "deckPrice", default)]
    pub deck_price: f64,
    /// Optional conversation key; omitted clients share one conversation.
    #[serde(rename = "conversationId", default)]
    pub conversation_id: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ResetRequest {
    #[serde(rename = "conversationId", default)]
    pub conversation_id: Option<String>,
}

/// POST /api/chat — run one assistant turn.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<TurnReply>, AppError> {
    let id = req.conversation_id.unwrap_or_else(|| "default".to_string());
    let reply = state
        .assistant
        .turn(
            &id,
            TurnRequest {
                message: req.message,
                deck_price: req.deck_price,
            },
        )
        .await?;
    Ok(Json(reply))
}

/// POST /api/reset — clear a conversation back to its initial state.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<Value>, AppError> {
    let id = req.conversation_id.unwrap_or_else(|| "default".to_string());
    state.assistant.reset(&id).await?;
    Ok(Json(json!({ "status": "success", "message": "Memory cleared." })))
}
