use crate::ai::{Content, LanguageModel, Role};
use crate::error::{GenerationCause, GenerationFailure};
use crate::models::Category;
use crate::normalizer::normalize;
use crate::prompts::{priming_history, question_prompt};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// One conversation with the model. History carries over between calls, so
/// a single instance should serve a single quiz.
pub struct QuestionGenerator {
    model: Arc<dyn LanguageModel>,
    history: Vec<Content>,
}

impl QuestionGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            history: priming_history(),
        }
    }

    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Asks for `count` questions of one category and returns the normalized reply.
    pub async fn generate(
        &mut self,
        topic: &str,
        difficulty: &str,
        category: Category,
        count: u32,
    ) -> Result<Value, GenerationFailure> {
        let prompt = question_prompt(topic, difficulty, category, count);
        let mut contents = self.history.clone();
        contents.push(Content::text(Role::User, prompt.clone()));

        let reply = self.model.generate(contents).await.map_err(|e| GenerationFailure {
            category,
            cause: GenerationCause::Upstream(format!("{:#}", e)),
        })?;
        debug!(%category, bytes = reply.len(), "model replied");

        // a failed call leaves no trace in the conversation; a bad reply does
        self.history.push(Content::text(Role::User, prompt));
        self.history.push(Content::text(Role::Model, reply.clone()));

        normalize(&reply).map_err(|e| GenerationFailure {
            category,
            cause: GenerationCause::Malformed(e),
        })
    }
}
