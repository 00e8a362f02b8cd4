pub mod ai;
pub mod assembler;
pub mod config;
pub mod error;
pub mod generator;
pub mod handlers;
pub mod limiter;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod routes;
pub mod scoring;
pub mod state;
pub mod store;

use std::sync::Arc;

pub fn build_state(config: &config::Config) -> anyhow::Result<state::AppState> {
    let model: Arc<dyn ai::LanguageModel> = Arc::new(ai::GeminiClient::new(&config.gemini)?);
    let limiter: Arc<dyn limiter::RateLimiter> = Arc::new(limiter::TokenBucketLimiter::new(
        config.generation_burst,
        config.generation_interval,
    ));
    let store: Arc<dyn store::QuizStore> = Arc::new(store::InMemoryQuizStore::new());
    Ok(state::AppState::new(model, limiter, store, config.allowed_origins()))
}
