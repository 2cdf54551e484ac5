//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the managed backend and the AI gateway.

use crate::domain::{AuthUser, ChatMessage, Flashcard, QuizQuestion, Summary};
use crate::prompts::Prompt;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// How a call to the AI gateway failed.
///
/// Only the status code decides the variant; the response body is never inspected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// HTTP 429. Transient, the caller may try again later.
    #[error("AI gateway rate limit exceeded")]
    RateLimited,
    /// HTTP 402. Needs operator action before any retry can succeed.
    #[error("AI gateway credits exhausted")]
    QuotaExhausted,
    /// Any other non-2xx status, transport failure or unusable response.
    #[error("AI gateway request failed: {message}")]
    Generic {
        status: Option<u16>,
        message: String,
    },
}

impl UpstreamError {
    /// Classifies a non-success HTTP status returned by the gateway.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            429 => UpstreamError::RateLimited,
            402 => UpstreamError::QuotaExhausted,
            _ => UpstreamError::Generic {
                status: Some(status),
                message: message.into(),
            },
        }
    }
}

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (backend, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Resolves a bearer token to the user it belongs to.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Returns `PortError::Unauthorized` when the token is unknown or expired.
    async fn authenticate(&self, access_token: &str) -> PortResult<AuthUser>;
}

/// Writes generated study material to the managed backend.
///
/// Every call carries the authenticated caller so adapters that write on the
/// user's behalf can forward the token.
#[async_trait]
pub trait StudyStore: Send + Sync {
    async fn save_summary(&self, auth: &AuthUser, summary: &Summary) -> PortResult<()>;

    async fn save_flashcard(
        &self,
        auth: &AuthUser,
        document_id: &str,
        card: &Flashcard,
    ) -> PortResult<()>;

    async fn save_quiz_question(
        &self,
        auth: &AuthUser,
        document_id: &str,
        question: &QuizQuestion,
    ) -> PortResult<()>;

    async fn save_chat_message(&self, auth: &AuthUser, message: &ChatMessage) -> PortResult<()>;

    /// Removes summaries, flashcards and quizzes previously generated for a document.
    async fn clear_generated_content(&self, auth: &AuthUser, document_id: &str) -> PortResult<()>;

    async fn mark_document_processed(&self, auth: &AuthUser, document_id: &str) -> PortResult<()>;
}

/// Produces completions from the hosted language model.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends one prompt and returns the text of the first completion.
    async fn complete(&self, prompt: &Prompt) -> PortResult<String>;
}
