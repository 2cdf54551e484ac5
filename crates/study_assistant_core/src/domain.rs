//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! Records are shaped here and persisted by whichever `StudyStore` adapter is wired in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The caller of a request, as resolved by the auth service.
///
/// The access token is kept so that persistence adapters which act on behalf of
/// the user (row-level security on the managed backend) can forward it.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub access_token: String,
}

/// A generated summary of one document. Documents themselves are created by the
/// upload flow; this service only flips their `processed` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub document_id: String,
    pub content: String,
}

/// A question/answer study card parsed from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// One multiple-choice question parsed from a quiz completion.
///
/// The model is asked for a JSON array but field naming drifts between
/// completions, hence the aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(alias = "correctAnswer", alias = "answer", default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the append-only conversation log of a document.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub document_id: String,
    pub user_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(document_id: &str, user_id: Uuid, role: ChatRole, content: &str) -> Self {
        Self {
            document_id: document_id.to_string(),
            user_id,
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Selects which prompt template a completion request is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Summary,
    Flashcards,
    Quiz,
    ChatAnswer,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContentKind::Summary => "summary",
            ContentKind::Flashcards => "flashcards",
            ContentKind::Quiz => "quiz",
            ContentKind::ChatAnswer => "chat-answer",
        };
        f.write_str(name)
    }
}

/// What to do with previously generated content when a document is processed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReprocessPolicy {
    /// Delete earlier summaries, flashcards and quizzes before storing new ones.
    #[default]
    Replace,
    /// Keep earlier rows and add the new ones next to them.
    Append,
}

impl std::str::FromStr for ReprocessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(ReprocessPolicy::Replace),
            "append" => Ok(ReprocessPolicy::Append),
            other => Err(format!("'{}' is not a valid reprocess policy", other)),
        }
    }
}
