use crate::ai::LanguageModel;
use crate::error::{GenerationCause, GenerationFailure, QuizError};
use crate::generator::QuestionGenerator;
use crate::limiter::RateLimiter;
use crate::models::{
    validate_request, BinaryQuestion, Category, GenerationRequest, LongAnswerQuestion, QuizQuestions,
    QuizRecord, ShortAnswerQuestion,
};
use crate::store::QuizStore;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub struct QuizAssembler {
    model: Arc<dyn LanguageModel>,
    limiter: Arc<dyn RateLimiter>,
    store: Arc<dyn QuizStore>,
}

impl QuizAssembler {
    pub fn new(model: Arc<dyn LanguageModel>, limiter: Arc<dyn RateLimiter>, store: Arc<dyn QuizStore>) -> Self {
        Self { model, limiter, store }
    }

    /// Validates, generates each requested category in turn, and stores the quiz.
    /// A failed category is logged and left empty.
    pub async fn assemble(&self, request: &GenerationRequest) -> Result<QuizRecord, QuizError> {
        let spec = validate_request(request).map_err(QuizError::invalid)?;
        let mut generator = QuestionGenerator::new(self.model.clone());
        let mut questions = QuizQuestions::default();

        for (category, count) in spec.counts {
            if count == 0 {
                continue;
            }
            self.limiter.acquire().await;
            let outcome = generator
                .generate(&spec.topic, &spec.difficulty, category, count)
                .await
                .and_then(|value| fill_category(&mut questions, category, value));
            match outcome {
                Ok(produced) => info!(%category, requested = count, produced, "generated questions"),
                Err(failure) => warn!(topic = %spec.topic, "{}", failure),
            }
        }

        let id = self.store.next_id().await?;
        let record = QuizRecord {
            id,
            topic: spec.topic.clone(),
            difficulty: spec.difficulty.clone(),
            total_questions: spec.total(),
            questions,
            created_at: Utc::now(),
        };
        self.store.put(record.clone()).await?;
        info!(
            quiz_id = record.id,
            total = record.total_questions,
            produced = record.questions.produced(),
            "quiz stored"
        );
        Ok(record)
    }
}

fn fill_category(questions: &mut QuizQuestions, category: Category, value: Value) -> Result<usize, GenerationFailure> {
    let shape = |msg: &str| GenerationFailure {
        category,
        cause: GenerationCause::UnexpectedShape(msg.to_string()),
    };
    match category {
        Category::MultipleChoice => {
            questions.mcqs = map_multiple_choice(value).ok_or_else(|| shape("expected an array"))?;
            Ok(questions.mcqs.len())
        }
        Category::TrueFalse => {
            questions.true_false = zip_answers(&value, category)
                .ok_or_else(|| shape("expected questions and answers"))?
                .into_iter()
                .map(|(question, answer)| BinaryQuestion {
                    question,
                    answer,
                    kind: category.tag().to_string(),
                })
                .collect();
            Ok(questions.true_false.len())
        }
        Category::ShortAnswer => {
            questions.one_liner = zip_answers(&value, category)
                .ok_or_else(|| shape("expected questions and answers"))?
                .into_iter()
                .map(|(question, answer)| ShortAnswerQuestion {
                    question,
                    answer,
                    kind: category.tag().to_string(),
                })
                .collect();
            Ok(questions.one_liner.len())
        }
        Category::LongAnswer => {
            questions.paragraph = map_long_answer(&value).ok_or_else(|| shape("expected questions"))?;
            Ok(questions.paragraph.len())
        }
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// An array reply is kept as-is, entry for entry.
pub fn map_multiple_choice(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// Pairs `questions[i]` with `answers[i]`; extra entries on either side are dropped.
pub fn zip_answers(value: &Value, category: Category) -> Option<Vec<(String, String)>> {
    let questions = value.get("questions")?.as_array()?;
    let answers = value.get("answers")?.as_array()?;
    if questions.len() != answers.len() {
        warn!(
            %category,
            questions = questions.len(),
            answers = answers.len(),
            "question/answer count mismatch, truncating"
        );
    }
    Some(
        questions
            .iter()
            .zip(answers.iter())
            .map(|(q, a)| (as_text(q), as_text(a)))
            .collect(),
    )
}

pub fn map_long_answer(value: &Value) -> Option<Vec<LongAnswerQuestion>> {
    let questions = value.get("questions")?.as_array()?;
    Some(
        questions
            .iter()
            .map(|q| LongAnswerQuestion {
                question: as_text(q),
                kind: Category::LongAnswer.tag().to_string(),
            })
            .collect(),
    )
}
