//! services/api/src/web/chat_task.rs
//!
//! Handles a single question-and-answer exchange about a document.

use crate::error::ApiError;
use crate::web::state::AppState;
use std::time::Instant;
use study_assistant_core::{
    domain::{AuthUser, ChatMessage, ChatRole},
    prompts::Prompt,
};
use tracing::{error, info};

/// Stores the question, asks the gateway for an answer and stores the answer.
///
/// The question is written before the gateway is called, so it stays in the log
/// even when no answer could be produced.
pub async fn chat_with_document(
    app_state: &AppState,
    user: &AuthUser,
    document_id: &str,
    message: &str,
    document_text: &str,
) -> Result<String, ApiError> {
    let question = ChatMessage::new(document_id, user.id, ChatRole::User, message);
    app_state.store.save_chat_message(user, &question).await?;

    let llm_start = Instant::now();
    let prompt = Prompt::chat_answer(document_text, message);
    let answer = app_state.completions.complete(&prompt).await.map_err(|e| {
        error!("AI chat error for document {}: {}", document_id, e);
        ApiError::from(e)
    })?;
    info!("⏱️ LLM took: {:?}", llm_start.elapsed());

    let reply = ChatMessage::new(document_id, user.id, ChatRole::Assistant, &answer);
    app_state.store.save_chat_message(user, &reply).await?;

    Ok(answer)
}
