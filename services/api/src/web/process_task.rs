//! services/api/src/web/process_task.rs
//!
//! Generates and stores the study material for one document: a summary, a set of
//! flashcards and a multiple-choice quiz.
//!
//! The three completions are requested concurrently and joined before anything is
//! written. Only the summary is required: if it cannot be generated the request
//! fails with a 500 and nothing is stored. Flashcards and quiz are best-effort, as are the
//! individual inserts; the `processed` flag is the last write and must succeed.

use crate::error::ApiError;
use crate::web::state::AppState;
use std::time::Instant;
use study_assistant_core::{
    domain::{AuthUser, ContentKind, Flashcard, QuizQuestion, ReprocessPolicy, Summary},
    parser::{parse_flashcards, parse_quiz},
    ports::{PortError, PortResult},
    prompts::Prompt,
};
use tracing::{error, info, warn};

/// What ended up in the store for one processing run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingReport {
    pub summary_stored: bool,
    pub flashcards_stored: usize,
    pub quiz_questions_stored: usize,
}

pub async fn process_document(
    app_state: &AppState,
    user: &AuthUser,
    document_id: &str,
    extracted_text: &str,
) -> Result<ProcessingReport, ApiError> {
    let start_time = Instant::now();
    let completions = &app_state.completions;

    let summary_prompt = Prompt::generation(ContentKind::Summary, extracted_text);
    let flashcards_prompt = Prompt::generation(ContentKind::Flashcards, extracted_text);
    let quiz_prompt = Prompt::generation(ContentKind::Quiz, extracted_text);

    let (summary, flashcards, quiz) = tokio::join!(
        completions.complete(&summary_prompt),
        completions.complete(&flashcards_prompt),
        completions.complete(&quiz_prompt),
    );
    info!("⏱️ Generation for document {} took: {:?}", document_id, start_time.elapsed());

    let summary = summary.map_err(summary_failure)?;
    let flashcards = flashcards_from(flashcards, document_id);
    let quiz = quiz_from(quiz, document_id);

    let store = &app_state.store;
    let mut report = ProcessingReport::default();

    if app_state.config.reprocess_policy == ReprocessPolicy::Replace {
        if let Err(e) = store.clear_generated_content(user, document_id).await {
            error!("Error clearing earlier content for document {}: {}", document_id, e);
        }
    }

    let summary = Summary {
        document_id: document_id.to_string(),
        content: summary,
    };
    match store.save_summary(user, &summary).await {
        Ok(()) => report.summary_stored = true,
        Err(e) => error!("Error storing summary for document {}: {}", document_id, e),
    }

    for card in &flashcards {
        match store.save_flashcard(user, document_id, card).await {
            Ok(()) => report.flashcards_stored += 1,
            Err(e) => warn!("Error storing flashcard for document {}: {}", document_id, e),
        }
    }

    for question in &quiz {
        match store.save_quiz_question(user, document_id, question).await {
            Ok(()) => report.quiz_questions_stored += 1,
            Err(e) => warn!("Error storing quiz question for document {}: {}", document_id, e),
        }
    }

    store.mark_document_processed(user, document_id).await?;

    Ok(report)
}

/// A failed summary aborts the request with a plain 500, whatever the gateway said.
fn summary_failure(err: PortError) -> ApiError {
    error!("Error generating summary: {}", err);
    ApiError::Internal("Failed to generate summary".to_string())
}

fn flashcards_from(completion: PortResult<String>, document_id: &str) -> Vec<Flashcard> {
    match completion {
        Ok(text) => parse_flashcards(&text),
        Err(e) => {
            warn!("Skipping flashcards for document {}: {}", document_id, e);
            Vec::new()
        }
    }
}

fn quiz_from(completion: PortResult<String>, document_id: &str) -> Vec<QuizQuestion> {
    let text = match completion {
        Ok(text) => text,
        Err(e) => {
            warn!("Skipping quiz for document {}: {}", document_id, e);
            return Vec::new();
        }
    };

    parse_quiz(&text).unwrap_or_else(|e| {
        error!("Error parsing quiz JSON for document {}: {}", document_id, e);
        Vec::new()
    })
}
