//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_assistant_core::ports::{AuthService, CompletionService, StudyStore};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Nothing in here is mutated after construction; each request works only with
/// its own data.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth: Arc<dyn AuthService>,
    pub store: Arc<dyn StudyStore>,
    pub completions: Arc<dyn CompletionService>,
}
