//! # Common Test Utilities
//!
//! In-memory stand-ins for the service ports plus helpers for driving the router.
//!
//! - `StaticAuth` accepts a single known token.
//! - `RecordingStore` keeps every write in order and can be told to fail some of them.
//! - `ScriptedCompletions` answers each content kind with a canned result and records
//!   every prompt it receives.

// Not every test file uses every helper.
#![allow(unused)]

use api_lib::{
    config::Config,
    web::{self, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::{
    collections::HashMap,
    io::Write,
    sync::{Arc, Mutex},
};
use study_assistant_core::{
    domain::{AuthUser, ChatMessage, ContentKind, Flashcard, QuizQuestion, Summary},
    ports::{AuthService, CompletionService, PortError, PortResult, StudyStore, UpstreamError},
    prompts::Prompt,
};
use tower::ServiceExt;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

pub const VALID_TOKEN: &str = "valid-token";
pub const USER_ID: Uuid = Uuid::from_u128(0x6d1f_4b0e_9a3c_4d2e_8f11_2233_4455_6677);

// --- Auth ---

pub struct StaticAuth;

#[async_trait]
impl AuthService for StaticAuth {
    async fn authenticate(&self, access_token: &str) -> PortResult<AuthUser> {
        if access_token == VALID_TOKEN {
            Ok(AuthUser {
                id: USER_ID,
                access_token: access_token.to_string(),
            })
        } else {
            Err(PortError::Unauthorized)
        }
    }
}

// --- Store ---

#[derive(Debug, Clone)]
pub enum StoredRow {
    Summary(Summary),
    Flashcard(String, Flashcard),
    Quiz(String, QuizQuestion),
    Chat(ChatMessage),
    Cleared(String),
    Processed(String),
}

#[derive(Default)]
pub struct RecordingStore {
    pub rows: Mutex<Vec<StoredRow>>,
    pub fail_summaries: bool,
    pub fail_flashcards: bool,
    pub fail_chat: bool,
    pub fail_processed: bool,
}

impl RecordingStore {
    pub fn rows(&self) -> Vec<StoredRow> {
        self.rows.lock().unwrap().clone()
    }

    pub fn summaries(&self) -> usize {
        self.count(|r| matches!(r, StoredRow::Summary(_)))
    }

    pub fn flashcards(&self) -> usize {
        self.count(|r| matches!(r, StoredRow::Flashcard(..)))
    }

    pub fn quiz_questions(&self) -> usize {
        self.count(|r| matches!(r, StoredRow::Quiz(..)))
    }

    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.rows()
            .into_iter()
            .filter_map(|r| match r {
                StoredRow::Chat(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn processed(&self, document_id: &str) -> bool {
        self.rows()
            .iter()
            .any(|r| matches!(r, StoredRow::Processed(id) if id == document_id))
    }

    fn count(&self, pred: impl Fn(&StoredRow) -> bool) -> usize {
        self.rows.lock().unwrap().iter().filter(|r| pred(r)).count()
    }

    fn record(&self, row: StoredRow, fail: bool) -> PortResult<()> {
        if fail {
            return Err(PortError::Unexpected("insert rejected".to_string()));
        }
        self.rows.lock().unwrap().push(row);
        Ok(())
    }
}

#[async_trait]
impl StudyStore for RecordingStore {
    async fn save_summary(&self, _auth: &AuthUser, summary: &Summary) -> PortResult<()> {
        self.record(StoredRow::Summary(summary.clone()), self.fail_summaries)
    }

    async fn save_flashcard(
        &self,
        _auth: &AuthUser,
        document_id: &str,
        card: &Flashcard,
    ) -> PortResult<()> {
        self.record(
            StoredRow::Flashcard(document_id.to_string(), card.clone()),
            self.fail_flashcards,
        )
    }

    async fn save_quiz_question(
        &self,
        _auth: &AuthUser,
        document_id: &str,
        question: &QuizQuestion,
    ) -> PortResult<()> {
        self.record(StoredRow::Quiz(document_id.to_string(), question.clone()), false)
    }

    async fn save_chat_message(&self, _auth: &AuthUser, message: &ChatMessage) -> PortResult<()> {
        self.record(StoredRow::Chat(message.clone()), self.fail_chat)
    }

    async fn clear_generated_content(&self, _auth: &AuthUser, document_id: &str) -> PortResult<()> {
        self.record(StoredRow::Cleared(document_id.to_string()), false)
    }

    async fn mark_document_processed(&self, _auth: &AuthUser, document_id: &str) -> PortResult<()> {
        self.record(StoredRow::Processed(document_id.to_string()), self.fail_processed)
    }
}

// --- Completions ---

#[derive(Default)]
pub struct ScriptedCompletions {
    pub replies: HashMap<ContentKind, Result<String, UpstreamError>>,
    pub prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedCompletions {
    pub fn with(mut self, kind: ContentKind, reply: Result<&str, UpstreamError>) -> Self {
        self.replies.insert(kind, reply.map(str::to_string));
        self
    }

    pub fn calls(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletions {
    async fn complete(&self, prompt: &Prompt) -> PortResult<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        match self.replies.get(&prompt.kind) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(e)) => Err(e.clone().into()),
            None => Err(UpstreamError::Generic {
                status: Some(500),
                message: format!("no scripted reply for {}", prompt.kind),
            }
            .into()),
        }
    }
}

// --- Logs ---

/// Collects formatted log lines so tests can assert on them.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Sends this thread's log events to a buffer until the guard is dropped.
///
/// `#[tokio::test]` runs on a single thread, so everything the handler logs lands here.
pub fn capture_logs() -> (LogBuffer, DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(buffer.clone())
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}

// --- Fixtures ---

pub const PHOTOSYNTHESIS: &str = "Photosynthesis is the process by which green plants use \
sunlight, water and carbon dioxide to produce glucose and oxygen. It takes place in the \
chloroplasts, where chlorophyll absorbs light energy.";

pub const SUMMARY_COMPLETION: &str = "- Plants turn light, water and CO2 into glucose and oxygen.\n\
- The process happens in chloroplasts.\n- Chlorophyll absorbs the light.";

pub const FLASHCARDS_COMPLETION: &str = "Q: What is photosynthesis?\nA: The process plants use to make glucose from light.\n\n\
Q: Which gas do plants absorb?\nA: Carbon dioxide.\n\n\
Q: Which gas do plants release?\nA: Oxygen.\n\n\
Q: Where does photosynthesis happen?\nA: In the chloroplasts.\n\n\
Q: What absorbs light energy?\nA: Chlorophyll.\n\n\
Q: What sugar is produced?\nA: Glucose.\n\n\
Q: What are the inputs?\nA: Sunlight, water and carbon dioxide.\n\n\
Q: What colour is chlorophyll?\nA: Green.\n\n\
Q: Which organisms photosynthesise?\nA: Green plants.";

pub const QUIZ_COMPLETION: &str = r#"Here is the quiz:
```json
[
  {"question": "What do plants release?", "options": ["A) Oxygen", "B) Nitrogen", "C) Helium", "D) Argon"], "correct_answer": "A", "explanation": "Oxygen is a by-product."},
  {"question": "Where does photosynthesis occur?", "options": ["A) Nucleus", "B) Chloroplast", "C) Ribosome", "D) Vacuole"], "correct_answer": "B", "explanation": "Chloroplasts hold chlorophyll."},
  {"question": "What absorbs light?", "options": ["A) Chlorophyll", "B) Keratin", "C) Insulin", "D) Collagen"], "correct_answer": "A", "explanation": "Chlorophyll is the pigment."},
  {"question": "Which sugar is made?", "options": ["A) Lactose", "B) Sucrose", "C) Glucose", "D) Maltose"], "correct_answer": "C", "explanation": "Glucose is the product."},
  {"question": "Which gas is absorbed?", "options": ["A) Oxygen", "B) Carbon dioxide", "C) Hydrogen", "D) Neon"], "correct_answer": "B", "explanation": "CO2 is an input."}
]
```"#;

pub fn scripted_document_completions() -> ScriptedCompletions {
    ScriptedCompletions::default()
        .with(ContentKind::Summary, Ok(SUMMARY_COMPLETION))
        .with(ContentKind::Flashcards, Ok(FLASHCARDS_COMPLETION))
        .with(ContentKind::Quiz, Ok(QUIZ_COMPLETION))
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = [
        ("SUPABASE_URL", "http://backend.test"),
        ("SUPABASE_ANON_KEY", "anon-key"),
        ("LOVABLE_API_KEY", "gateway-key"),
    ]
    .iter()
    .chain(extra.iter())
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    Config::from_lookup(move |key| vars.get(key).cloned()).expect("test config is valid")
}

pub fn build_app(
    config: Config,
    store: Arc<RecordingStore>,
    completions: Arc<dyn CompletionService>,
) -> Router {
    let state = Arc::new(AppState {
        config: Arc::new(config),
        auth: Arc::new(StaticAuth),
        store,
        completions,
    });
    web::router(state)
}

/// Sends a JSON POST and returns the status and the decoded body.
pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }

    let response = app
        .oneshot(request.body(Body::from(body.to_string())).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
