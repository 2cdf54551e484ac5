pub mod domain;
pub mod parser;
pub mod ports;
pub mod prompts;

pub use domain::{
    AuthUser, ChatMessage, ChatRole, ContentKind, Flashcard, QuizQuestion, ReprocessPolicy,
    Summary,
};
pub use parser::{extract_json_block, parse_flashcards, parse_quiz, ParseError};
pub use ports::{AuthService, CompletionService, PortError, PortResult, StudyStore, UpstreamError};
pub use prompts::Prompt;
