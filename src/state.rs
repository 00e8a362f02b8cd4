use crate::ai::LanguageModel;
use crate::assembler::QuizAssembler;
use crate::limiter::RateLimiter;
use crate::store::QuizStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QuizStore>,
    pub assembler: Arc<QuizAssembler>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        limiter: Arc<dyn RateLimiter>,
        store: Arc<dyn QuizStore>,
        allowed_origins: Vec<String>,
    ) -> Self {
        Self {
            assembler: Arc::new(QuizAssembler::new(model, limiter, store.clone())),
            store,
            allowed_origins: Arc::new(allowed_origins),
        }
    }
}
