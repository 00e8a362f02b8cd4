use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "mcqs")]
    MultipleChoice,
    #[serde(rename = "bool")]
    TrueFalse,
    #[serde(rename = "oneLine")]
    ShortAnswer,
    #[serde(rename = "para")]
    LongAnswer,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::MultipleChoice,
        Category::TrueFalse,
        Category::ShortAnswer,
        Category::LongAnswer,
    ];

    /// Name used in requests and in the prompt sent to the model.
    pub fn wire_name(self) -> &'static str {
        match self {
            Category::MultipleChoice => "mcqs",
            Category::TrueFalse => "bool",
            Category::ShortAnswer => "oneLine",
            Category::LongAnswer => "para",
        }
    }

    /// Tag carried by every produced question of this category.
    pub fn tag(self) -> &'static str {
        match self {
            Category::MultipleChoice => "mcqs",
            Category::TrueFalse => "true_false",
            Category::ShortAnswer => "one_liner",
            Category::LongAnswer => "explanatory",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.wire_name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// True/false question; `answer` is "True" or "False" as the model wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryQuestion {
    pub question: String,
    pub answer: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortAnswerQuestion {
    pub question: String,
    pub answer: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Essay question, never graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongAnswerQuestion {
    pub question: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestions {
    /// Entries exactly as the model returned them: `{question, options, answer, type}`
    /// with a 1-based `answer`, though nothing forces a model to comply.
    pub mcqs: Vec<Value>,
    pub true_false: Vec<BinaryQuestion>,
    pub one_liner: Vec<ShortAnswerQuestion>,
    pub paragraph: Vec<LongAnswerQuestion>,
}

impl QuizQuestions {
    pub fn produced(&self) -> usize {
        self.mcqs.len() + self.true_false.len() + self.one_liner.len() + self.paragraph.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: i64,
    pub topic: String,
    /// As supplied by the client; never normalized.
    pub difficulty: String,
    pub questions: QuizQuestions,
    /// Sum of the requested counts, not of the questions actually produced.
    pub total_questions: u32,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/quiz/generate`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenerationRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub topic: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub difficulty: String,
    #[serde(default)]
    pub mcqs: u32,
    #[serde(default, rename = "bool")]
    pub true_false: u32,
    #[serde(default, rename = "oneLine")]
    pub one_line: u32,
    #[serde(default)]
    pub para: u32,
}

impl GenerationRequest {
    pub fn count_for(&self, category: Category) -> u32 {
        match category {
            Category::MultipleChoice => self.mcqs,
            Category::TrueFalse => self.true_false,
            Category::ShortAnswer => self.one_line,
            Category::LongAnswer => self.para,
        }
    }

    pub fn total(&self) -> u32 {
        Category::ALL.iter().map(|c| self.count_for(*c)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
}

/// A request that passed validation; what the assembler works from.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSpec {
    pub topic: String,
    pub difficulty: String,
    pub counts: [(Category, u32); 4],
}

impl QuizSpec {
    pub fn total(&self) -> u32 {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Maps a struct field name back to the key the client sent.
pub fn wire_field(field: &str) -> &str {
    match field {
        "true_false" => Category::TrueFalse.wire_name(),
        "one_line" => Category::ShortAnswer.wire_name(),
        other => other,
    }
}

pub fn validate_request(req: &GenerationRequest) -> Result<QuizSpec, Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if let Err(errors) = req.validate() {
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                issues.push(ValidationIssue {
                    field: wire_field(&field).to_string(),
                    issue: err.code.to_string(),
                });
            }
        }
    }

    let topic = req.topic.trim();
    if topic.is_empty() && !issues.iter().any(|i| i.field == "topic") {
        issues.push(ValidationIssue {
            field: "topic".into(),
            issue: "must not be empty".into(),
        });
    }

    if req.difficulty.trim().is_empty() && !issues.iter().any(|i| i.field == "difficulty") {
        issues.push(ValidationIssue {
            field: "difficulty".into(),
            issue: "must not be empty".into(),
        });
    }

    if req.total() == 0 {
        issues.push(ValidationIssue {
            field: "questions".into(),
            issue: "at least one question type must be selected".into(),
        });
    }

    if !issues.is_empty() {
        return Err(issues);
    }
    Ok(QuizSpec {
        topic: topic.to_string(),
        difficulty: req.difficulty.clone(),
        counts: Category::ALL.map(|c| (c, req.count_for(c))),
    })
}
