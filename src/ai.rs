//! Seam to the external generative-language model.

use crate::models::Category;
use anyhow::Context;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn text_joined(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Sampling parameters sent with every request. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 65536,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

/// Sends a whole conversation and returns the reply text of the next model turn.
pub trait LanguageModel: Send + Sync {
    fn generate(&self, contents: Vec<Content>) -> BoxFuture<'static, anyhow::Result<String>>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub settings: GenerationSettings,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    settings: GenerationSettings,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    generation_config: &'a GenerationSettings,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("building http client")?;
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            settings: config.settings.clone(),
        })
    }
}

fn reply_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .iter()
                .filter(|p| !p.text.is_empty())
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

impl LanguageModel for GeminiClient {
    fn generate(&self, contents: Vec<Content>) -> BoxFuture<'static, anyhow::Result<String>> {
        let client = self.clone();
        Box::pin(async move {
            let body = GenerateContentRequest {
                contents: &contents,
                generation_config: &client.settings,
            };
            let response = client
                .http
                .post(&client.endpoint)
                .header("x-goog-api-key", &client.api_key)
                .json(&body)
                .send()
                .await
                .context("gemini request failed")?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                let snippet: String = text.chars().take(300).collect();
                anyhow::bail!("gemini returned {}: {}", status, snippet);
            }

            let parsed: GenerateContentResponse = response
                .json()
                .await
                .context("decoding gemini response")?;
            Ok(reply_text(parsed))
        })
    }
}

#[derive(Debug, Clone)]
enum FixtureReply {
    Raw(String),
    Fail(String),
}

/// Offline model answering every category with deterministic questions.
/// Individual categories can be overridden with raw text or a failure.
#[derive(Clone, Default)]
pub struct FixtureModel {
    overrides: Arc<HashMap<Category, FixtureReply>>,
    requests: Arc<Mutex<Vec<Vec<Content>>>>,
}

impl FixtureModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, category: Category, raw: impl Into<String>) -> Self {
        self.with_override(category, FixtureReply::Raw(raw.into()))
    }

    pub fn with_failure(self, category: Category, message: impl Into<String>) -> Self {
        self.with_override(category, FixtureReply::Fail(message.into()))
    }

    fn with_override(self, category: Category, reply: FixtureReply) -> Self {
        let mut overrides = (*self.overrides).clone();
        overrides.insert(category, reply);
        Self {
            overrides: Arc::new(overrides),
            requests: self.requests,
        }
    }

    /// Every conversation sent so far, oldest first.
    pub async fn requests(&self) -> Vec<Vec<Content>> {
        self.requests.lock().await.clone()
    }
}

fn field_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    let to = rest.find(end)?;
    Some(&rest[..to])
}

pub fn fixture_reply(topic: &str, category: Category, count: u32) -> String {
    let numbers = 1..=count;
    match category {
        Category::MultipleChoice => {
            let items: Vec<_> = numbers
                .map(|n| {
                    json!({
                        "question": format!("{topic}: multiple choice {n}"),
                        "options": ["Option 1", "Option 2", "Option 3", "Option 4"],
                        "answer": (n - 1) % 4 + 1,
                        "type": "mcqs"
                    })
                })
                .collect();
            format!("```json\n{}\n```", serde_json::Value::Array(items))
        }
        Category::TrueFalse => {
            let questions: Vec<_> = numbers.clone().map(|n| format!("{topic}: statement {n}")).collect();
            let answers: Vec<_> = numbers
                .map(|n| if n % 2 == 1 { "True" } else { "False" })
                .collect();
            json!({"result": {"questions": questions, "answers": answers, "type": "true_false"}}).to_string()
        }
        Category::ShortAnswer => {
            let questions: Vec<_> = numbers.clone().map(|n| format!("{topic}: short question {n}")).collect();
            let answers: Vec<_> = numbers.map(|n| format!("answer {n}")).collect();
            json!({"questions": questions, "answers": answers, "type": "one_liner"}).to_string()
        }
        Category::LongAnswer => {
            let questions: Vec<_> = numbers.map(|n| format!("{topic}: explain {n}")).collect();
            json!({"questions": questions, "type": "explanatory"}).to_string()
        }
    }
}

impl LanguageModel for FixtureModel {
    fn generate(&self, contents: Vec<Content>) -> BoxFuture<'static, anyhow::Result<String>> {
        let overrides = self.overrides.clone();
        let requests = self.requests.clone();
        Box::pin(async move {
            let prompt = contents
                .last()
                .filter(|c| c.role == Role::User)
                .map(Content::text_joined)
                .unwrap_or_default();
            requests.lock().await.push(contents);

            let category = field_between(&prompt, "Question Type: ", ",")
                .and_then(Category::from_wire_name)
                .context("prompt carries no question type")?;
            let topic = field_between(&prompt, "Topic: ", ", Difficulty:").unwrap_or("General");
            let count = field_between(&prompt, "Number of Questions: ", ".")
                .and_then(|n| n.trim().parse::<u32>().ok())
                .unwrap_or(1);

            match overrides.get(&category) {
                Some(FixtureReply::Raw(raw)) => Ok(raw.clone()),
                Some(FixtureReply::Fail(message)) => Err(anyhow::anyhow!(message.clone())),
                None => Ok(fixture_reply(topic, category, count)),
            }
        })
    }
}
