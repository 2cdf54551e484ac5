//! services/api/src/adapters/supabase.rs
//!
//! Adapter for the managed backend. It resolves bearer tokens through the auth API
//! and writes generated content through the REST (PostgREST) interface, forwarding
//! the caller's token so the backend's row-level policies apply.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use study_assistant_core::{
    domain::{AuthUser, ChatMessage, ChatRole, Flashcard, QuizQuestion, Summary},
    ports::{AuthService, PortError, PortResult, StudyStore},
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Tables holding content generated from a document.
const GENERATED_TABLES: [&str; 3] = ["summaries", "flashcards", "quizzes"];

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct SupabaseAdapter {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAdapter {
    pub fn new(client: Client, base_url: &str, anon_key: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Attaches the project key and the caller's token.
    fn authorized(&self, builder: RequestBuilder, access_token: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    async fn insert<T: Serialize + Sync>(
        &self,
        auth: &AuthUser,
        table: &str,
        row: &T,
    ) -> PortResult<()> {
        let request = self
            .authorized(self.client.post(self.table_url(table)), &auth.access_token)
            .header("Prefer", "return=minimal")
            .json(row);
        let response = send(request, table).await?;
        ensure_success(response, "insert into", table).await
    }
}

async fn send(request: RequestBuilder, table: &str) -> PortResult<Response> {
    request
        .send()
        .await
        .map_err(|e| PortError::Unexpected(format!("Request to table {} failed: {}", table, e)))
}

async fn ensure_success(response: Response, action: &str, table: &str) -> PortResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(PortError::Unexpected(format!(
        "Failed to {} {} ({}): {}",
        action, table, status, body
    )))
}

//=========================================================================================
// Row Structs (REST payloads)
//=========================================================================================

#[derive(Serialize)]
struct SummaryRow<'a> {
    document_id: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct FlashcardRow<'a> {
    document_id: &'a str,
    question: &'a str,
    answer: &'a str,
}

#[derive(Serialize)]
struct QuizRow<'a> {
    document_id: &'a str,
    question: &'a str,
    options: &'a [String],
    correct_answer: &'a str,
    explanation: &'a str,
}

#[derive(Serialize)]
struct ChatMessageRow<'a> {
    document_id: &'a str,
    user_id: Uuid,
    role: ChatRole,
    content: &'a str,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ProcessedUpdate {
    processed: bool,
}

#[derive(Deserialize)]
struct UserRecord {
    id: Uuid,
}

//=========================================================================================
// `AuthService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthService for SupabaseAdapter {
    async fn authenticate(&self, access_token: &str) -> PortResult<AuthUser> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .authorized(self.client.get(url), access_token)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Auth request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!("Auth service rejected token ({})", response.status());
            return Err(PortError::Unauthorized);
        }

        let user: UserRecord = response.json().await.map_err(|e| {
            warn!("Auth service returned an unreadable user: {}", e);
            PortError::Unauthorized
        })?;

        Ok(AuthUser {
            id: user.id,
            access_token: access_token.to_string(),
        })
    }
}

//=========================================================================================
// `StudyStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyStore for SupabaseAdapter {
    async fn save_summary(&self, auth: &AuthUser, summary: &Summary) -> PortResult<()> {
        let row = SummaryRow {
            document_id: &summary.document_id,
            content: &summary.content,
        };
        self.insert(auth, "summaries", &row).await
    }

    async fn save_flashcard(
        &self,
        auth: &AuthUser,
        document_id: &str,
        card: &Flashcard,
    ) -> PortResult<()> {
        let row = FlashcardRow {
            document_id,
            question: &card.question,
            answer: &card.answer,
        };
        self.insert(auth, "flashcards", &row).await
    }

    async fn save_quiz_question(
        &self,
        auth: &AuthUser,
        document_id: &str,
        question: &QuizQuestion,
    ) -> PortResult<()> {
        let row = QuizRow {
            document_id,
            question: &question.question,
            options: &question.options,
            correct_answer: &question.correct_answer,
            explanation: &question.explanation,
        };
        self.insert(auth, "quizzes", &row).await
    }

    async fn save_chat_message(&self, auth: &AuthUser, message: &ChatMessage) -> PortResult<()> {
        let row = ChatMessageRow {
            document_id: &message.document_id,
            user_id: message.user_id,
            role: message.role,
            content: &message.content,
            created_at: message.created_at,
        };
        self.insert(auth, "chat_messages", &row).await
    }

    async fn clear_generated_content(&self, auth: &AuthUser, document_id: &str) -> PortResult<()> {
        let filter = format!("eq.{}", document_id);
        for table in GENERATED_TABLES {
            debug!("Clearing {} for document {}", table, document_id);
            let request = self
                .authorized(self.client.delete(self.table_url(table)), &auth.access_token)
                .query(&[("document_id", filter.as_str())]);
            let response = send(request, table).await?;
            ensure_success(response, "delete from", table).await?;
        }
        Ok(())
    }

    async fn mark_document_processed(&self, auth: &AuthUser, document_id: &str) -> PortResult<()> {
        let filter = format!("eq.{}", document_id);
        let request = self
            .authorized(self.client.patch(self.table_url("documents")), &auth.access_token)
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&ProcessedUpdate { processed: true });
        let response = send(request, "documents").await?;
        ensure_success(response, "update", "documents").await
    }
}
