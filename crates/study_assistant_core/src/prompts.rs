//! crates/study_assistant_core/src/prompts.rs
//!
//! Fixed two-message prompt templates, one per content kind.

use crate::domain::ContentKind;

const SUMMARY_SYSTEM: &str = "You are an expert educational content analyzer. Create clear, concise summaries that highlight key concepts and main ideas.";
const SUMMARY_USER: &str =
    "Summarize the following educational content into clear, structured key points:\n\n{text}";

const FLASHCARDS_SYSTEM: &str = "You are an expert at creating study flashcards. Create clear question-answer pairs that test understanding.";
const FLASHCARDS_USER: &str = "Generate 8-10 flashcards from this content. Format each as 'Q: [question]\nA: [answer]' separated by double newlines:\n\n{text}";

const QUIZ_SYSTEM: &str = "You are an expert at creating educational quizzes. Create multiple choice questions with 4 options each.";
const QUIZ_USER: &str = "Generate 5 multiple-choice questions from this content. For each question, provide: Question, 4 options (A-D), correct answer letter, and brief explanation. Format as JSON array:\n\n{text}";

const CHAT_SYSTEM: &str = "You are a helpful study assistant. Answer questions based on the provided document content. Be clear, concise, and educational.";

/// A system instruction plus the user message sent with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: ContentKind,
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Builds the generation prompt for summary, flashcards or quiz content.
    ///
    /// `ContentKind::ChatAnswer` needs a question as well; use [`Prompt::chat_answer`].
    pub fn generation(kind: ContentKind, text: &str) -> Self {
        let (system, user) = match kind {
            ContentKind::Summary => (SUMMARY_SYSTEM, SUMMARY_USER),
            ContentKind::Flashcards => (FLASHCARDS_SYSTEM, FLASHCARDS_USER),
            ContentKind::Quiz => (QUIZ_SYSTEM, QUIZ_USER),
            ContentKind::ChatAnswer => return Self::chat_answer(text, ""),
        };
        Self {
            kind,
            system: system.to_string(),
            user: user.replace("{text}", text),
        }
    }

    pub fn chat_answer(document_text: &str, question: &str) -> Self {
        Self {
            kind: ContentKind::ChatAnswer,
            system: CHAT_SYSTEM.to_string(),
            user: format!("Document content:\n{}\n\nQuestion: {}", document_text, question),
        }
    }
}
