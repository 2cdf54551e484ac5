//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::{chat_task::chat_with_document, process_task::process_document, state::AppState};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    Extension,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use study_assistant_core::domain::AuthUser;
use tracing::info;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        process_document_handler,
        chat_with_document_handler,
        health_handler,
    ),
    components(
        schemas(ProcessDocumentRequest, ChatRequest, SuccessResponse, ErrorResponse)
    ),
    tags(
        (name = "Study Assistant API", description = "Generates study material from documents and answers questions about them.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Request body for `/process-document`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDocumentRequest {
    pub document_id: Option<String>,
    pub extracted_text: Option<String>,
}

/// Request body for `/chat-with-document`.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub document_id: Option<String>,
    pub message: Option<String>,
    pub document_text: Option<String>,
}

/// The body returned by both endpoints on success.
#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// The body returned by both endpoints on failure.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Returns the value only when it is present and non-empty.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a summary, flashcards and a quiz for a document.
#[utoipa::path(
    post,
    path = "/process-document",
    request_body = ProcessDocumentRequest,
    responses(
        (status = 200, description = "Document processed", body = SuccessResponse),
        (status = 400, description = "Missing documentId or extractedText", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 402, description = "AI credits exhausted", body = ErrorResponse),
        (status = 429, description = "AI gateway rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("Authorization" = String, Header, description = "Bearer token of the signed-in user.")
    )
)]
pub async fn process_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProcessDocumentRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let request = json_body(payload)?;
    let (Some(document_id), Some(extracted_text)) =
        (present(&request.document_id), present(&request.extracted_text))
    else {
        return Err(ApiError::Validation(
            "Missing documentId or extractedText".to_string(),
        ));
    };

    info!("Processing document {} for user {}", document_id, user.id);
    let report = process_document(&app_state, &user, document_id, extracted_text).await?;
    info!(
        "Document {} processed: summary stored = {}, {} flashcards, {} quiz questions",
        document_id, report.summary_stored, report.flashcards_stored, report.quiz_questions_stored
    );

    Ok(Json(SuccessResponse {
        success: true,
        message: "Document processed successfully".to_string(),
    }))
}

/// Answer a question about a document and record the exchange.
#[utoipa::path(
    post,
    path = "/chat-with-document",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "The assistant's answer", body = SuccessResponse),
        (status = 400, description = "Missing required parameters", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 402, description = "AI credits exhausted", body = ErrorResponse),
        (status = 429, description = "AI gateway rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("Authorization" = String, Header, description = "Bearer token of the signed-in user.")
    )
)]
pub async fn chat_with_document_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let request = json_body(payload)?;
    let (Some(document_id), Some(message), Some(document_text)) = (
        present(&request.document_id),
        present(&request.message),
        present(&request.document_text),
    ) else {
        return Err(ApiError::Validation("Missing required parameters".to_string()));
    };

    info!("Processing chat for document {}", document_id);
    let answer = chat_with_document(&app_state, &user, document_id, message, document_text).await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: answer,
    }))
}

/// Liveness probe for the hosting platform.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The service is up", body = String))
)]
pub async fn health_handler() -> &'static str {
    "OK"
}
