//! Grading of a submitted answer sheet. Only multiple-choice and true/false
//! questions are graded; written answers are returned for review.

use crate::models::QuizRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerSheet {
    /// 1-based option index per question, `null` when skipped.
    pub mcqs: Vec<Option<u32>>,
    pub true_false: Vec<Option<String>>,
    pub one_liner: Vec<String>,
    pub paragraph: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrittenResponse {
    pub question: String,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub quiz_id: i64,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub grade: &'static str,
    pub written_responses: Vec<WrittenResponse>,
}

pub fn letter_grade(percentage: u32) -> &'static str {
    match percentage {
        90.. => "A+",
        80..=89 => "A",
        70..=79 => "B+",
        60..=69 => "B",
        50..=59 => "C+",
        40..=49 => "C",
        30..=39 => "D",
        _ => "F",
    }
}

/// 1-based correct option of a stored multiple-choice entry. Models sometimes
/// quote the number, so numeric strings count too.
pub fn choice_answer(entry: &Value) -> Option<u32> {
    match entry.get("answer")? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn score_quiz(quiz: &QuizRecord, sheet: &AnswerSheet) -> ScoreReport {
    let mcq_correct = quiz
        .questions
        .mcqs
        .iter()
        .zip(sheet.mcqs.iter())
        .filter(|(q, picked)| picked.is_some() && **picked == choice_answer(q))
        .count();

    let tf_correct = quiz
        .questions
        .true_false
        .iter()
        .zip(sheet.true_false.iter())
        .filter(|(q, given)| {
            given
                .as_deref()
                .map(|g| g.trim().eq_ignore_ascii_case(q.answer.trim()))
                .unwrap_or(false)
        })
        .count();

    let score = (mcq_correct + tf_correct) as u32;
    let total = quiz.total_questions;
    let percentage = if total == 0 {
        0
    } else {
        ((f64::from(score) / f64::from(total)) * 100.0).round() as u32
    };

    let mut written_responses: Vec<WrittenResponse> = quiz
        .questions
        .one_liner
        .iter()
        .zip(sheet.one_liner.iter())
        .map(|(q, r)| WrittenResponse {
            question: q.question.clone(),
            response: r.clone(),
            expected: Some(q.answer.clone()),
        })
        .collect();
    written_responses.extend(
        quiz.questions
            .paragraph
            .iter()
            .zip(sheet.paragraph.iter())
            .map(|(q, r)| WrittenResponse {
                question: q.question.clone(),
                response: r.clone(),
                expected: None,
            }),
    );

    ScoreReport {
        quiz_id: quiz.id,
        score,
        total_questions: total,
        percentage,
        grade: letter_grade(percentage),
        written_responses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BinaryQuestion, LongAnswerQuestion, QuizQuestions, ShortAnswerQuestion,
    };
    use chrono::Utc;
    use serde_json::json;

    fn quiz() -> QuizRecord {
        QuizRecord {
            id: 9,
            topic: "Geography".into(),
            difficulty: "Medium".into(),
            questions: QuizQuestions {
                mcqs: vec![
                    json!({
                        "question": "Capital of France?",
                        "options": ["Berlin", "Madrid", "Paris", "Rome"],
                        "answer": 3,
                        "type": "mcqs"
                    }),
                    json!({
                        "question": "Largest ocean?",
                        "options": ["Pacific", "Atlantic", "Indian", "Arctic"],
                        "answer": 1,
                        "type": "mcqs"
                    }),
                ],
                true_false: vec![BinaryQuestion {
                    question: "The Earth is round".into(),
                    answer: "True".into(),
                    kind: "true_false".into(),
                }],
                one_liner: vec![ShortAnswerQuestion {
                    question: "Longest river?".into(),
                    answer: "Nile".into(),
                    kind: "one_liner".into(),
                }],
                paragraph: vec![LongAnswerQuestion {
                    question: "Explain plate tectonics".into(),
                    kind: "explanatory".into(),
                }],
            },
            total_questions: 5,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn grades_choice_and_true_false_only() {
        let sheet = AnswerSheet {
            mcqs: vec![Some(3), Some(2)],
            true_false: vec![Some(" true ".into())],
            one_liner: vec!["Nile".into()],
            paragraph: vec!["Plates move.".into()],
        };
        let report = score_quiz(&quiz(), &sheet);
        assert_eq!(report.score, 2);
        assert_eq!(report.total_questions, 5);
        assert_eq!(report.percentage, 40);
        assert_eq!(report.grade, "C");
        assert_eq!(report.written_responses.len(), 2);
        assert_eq!(report.written_responses[0].expected.as_deref(), Some("Nile"));
        assert_eq!(report.written_responses[1].expected, None);
    }

    #[test]
    fn quoted_choice_answers_are_graded() {
        let mut q = quiz();
        q.questions.mcqs[0]["answer"] = json!(" 3 ");
        q.questions.mcqs[1] = json!({"question": "no answer key"});
        let sheet = AnswerSheet {
            mcqs: vec![Some(3), Some(1)],
            ..AnswerSheet::default()
        };
        assert_eq!(score_quiz(&q, &sheet).score, 1);
        assert_eq!(choice_answer(&json!({"answer": "x"})), None);
    }

    #[test]
    fn skipped_answers_score_nothing() {
        let report = score_quiz(&quiz(), &AnswerSheet::default());
        assert_eq!(report.score, 0);
        assert_eq!(report.grade, "F");
        assert!(report.written_responses.is_empty());
    }

    #[test]
    fn empty_quiz_is_zero_percent() {
        let mut q = quiz();
        q.total_questions = 0;
        assert_eq!(score_quiz(&q, &AnswerSheet::default()).percentage, 0);
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(letter_grade(100), "A+");
        assert_eq!(letter_grade(90), "A+");
        assert_eq!(letter_grade(89), "A");
        assert_eq!(letter_grade(70), "B+");
        assert_eq!(letter_grade(50), "C+");
        assert_eq!(letter_grade(30), "D");
        assert_eq!(letter_grade(29), "F");
    }
}
