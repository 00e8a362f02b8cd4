//! Canned conversation that teaches the model the reply formats, and the
//! per-request prompt. Text is sent exactly as written here.

use crate::ai::{Content, Role};
use crate::models::Category;

pub const GREETING: &str = "hello";

pub const GREETING_REPLY: &str = "Hello there! How can I help you today? 😊";

pub const FORMAT_INSTRUCTIONS: &str = r#"I am going to use you for customized quiz generation. I will give you:
- a topic,
- difficulty level (easy, medium, hard),
- types of questions (mcqs, bool, oneLine, para),
- number of questions for each type.

You must return a JSON object in the correct format based on the question type:

For mcqs (multiple choice questions):
Return an array of objects with:
- "question": "question text",
- "options": ["option1", "option2", "option3", "option4"],
- "answer": (index number, 1-based),
- "type": "mcqs"

For bool (true/false questions):
Return an object with:
- "questions": ["question1", "question2", ...],
- "answers": ["True", "False", ...],
- "type": "true_false"

For oneLine (short answer questions):
Return an object with:
- "questions": ["question1", "question2", ...],
- "answers": ["answer1", "answer2", ...],
- "type": "one_liner"

For para (paragraph/essay questions):
Return an object with:
- "questions": ["question1", "question2", ...],
- "type": "explanatory"

Examples:
MCQs: [{"question": "What is the capital of France?", "options": ["Berlin", "Madrid", "Paris", "Rome"], "answer": 3, "type": "mcqs"}]
True/False: {"questions": ["The Earth is round"], "answers": ["True"], "type": "true_false"}
One Line: {"questions": ["What is 2+2?"], "answers": ["4"], "type": "one_liner"}
Paragraph: {"questions": ["Explain photosynthesis"], "type": "explanatory"}

Do not include any explanation or extra text. Just return the JSON object in the exact format specified."#;

pub const FORMAT_ACK: &str = "Yes, I understand. I will return a JSON object with the specified format for each question type. No extra text will be added. Ready when you are!";

pub fn priming_history() -> Vec<Content> {
    vec![
        Content::text(Role::User, GREETING),
        Content::text(Role::Model, GREETING_REPLY),
        Content::text(Role::User, FORMAT_INSTRUCTIONS),
        Content::text(Role::Model, FORMAT_ACK),
    ]
}

pub fn question_prompt(topic: &str, difficulty: &str, category: Category, count: u32) -> String {
    format!(
        "Topic: {}, Difficulty: {}, Question Type: {}, Number of Questions: {}. Generate the quiz object as discussed. Only respond with the final JSON object. Do not include any explanation or text.",
        topic,
        difficulty,
        category.wire_name(),
        count
    )
}
