//! Application state shared by all handlers

use std::sync::Arc;

use crate::domain::AnswerBackend;
use crate::infrastructure::cache::CacheEngine;

/// Cheap to clone; handlers share one engine and backend
#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: Arc<CacheEngine>,
    pub backend: Arc<dyn AnswerBackend>,
}

impl AppState {
    pub fn new(engine: Arc<CacheEngine>, backend: Arc<dyn AnswerBackend>) -> Self {
        Self { engine, backend }
    }
}
