//! services/api/src/adapters/db.rs
//!
//! This module contains the direct database adapter, a concrete implementation of the
//! `StudyStore` port backed by PostgreSQL through `sqlx`. It is used instead of the
//! REST adapter when the service is given a `DATABASE_URL`; the connection is trusted,
//! so the caller's token is not forwarded.

use async_trait::async_trait;
use sqlx::PgPool;
use study_assistant_core::domain::{AuthUser, ChatMessage, Flashcard, QuizQuestion, Summary};
use study_assistant_core::ports::{PortError, PortResult, StudyStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `StudyStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `StudyStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl StudyStore for DbAdapter {
    async fn save_summary(&self, _auth: &AuthUser, summary: &Summary) -> PortResult<()> {
        sqlx::query("INSERT INTO summaries (document_id, content) VALUES ($1::uuid, $2)")
            .bind(&summary.document_id)
            .bind(&summary.content)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn save_flashcard(
        &self,
        _auth: &AuthUser,
        document_id: &str,
        card: &Flashcard,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO flashcards (document_id, question, answer) VALUES ($1::uuid, $2, $3)",
        )
        .bind(document_id)
        .bind(&card.question)
        .bind(&card.answer)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn save_quiz_question(
        &self,
        _auth: &AuthUser,
        document_id: &str,
        question: &QuizQuestion,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO quizzes (document_id, question, options, correct_answer, explanation) \
             VALUES ($1::uuid, $2, $3, $4, $5)",
        )
        .bind(document_id)
        .bind(&question.question)
        .bind(&question.options)
        .bind(&question.correct_answer)
        .bind(&question.explanation)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn save_chat_message(&self, _auth: &AuthUser, message: &ChatMessage) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO chat_messages (document_id, user_id, role, content, created_at) \
             VALUES ($1::uuid, $2, $3, $4, $5)",
        )
        .bind(&message.document_id)
        .bind(message.user_id)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn clear_generated_content(&self, _auth: &AuthUser, document_id: &str) -> PortResult<()> {
        // One transaction so a failed delete leaves the earlier content intact.
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        for statement in [
            "DELETE FROM summaries WHERE document_id = $1::uuid",
            "DELETE FROM flashcards WHERE document_id = $1::uuid",
            "DELETE FROM quizzes WHERE document_id = $1::uuid",
        ] {
            sqlx::query(statement)
                .bind(document_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        }
        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn mark_document_processed(&self, _auth: &AuthUser, document_id: &str) -> PortResult<()> {
        sqlx::query("UPDATE documents SET processed = TRUE WHERE id = $1::uuid")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
