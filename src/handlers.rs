use crate::error::{AppError, ErrorDetail};
use crate::models::{GenerationRequest, QuizRecord};
use crate::scoring::{score_quiz, AnswerSheet, ScoreReport};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

fn request_id_from_headers(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn body_rejection(rejection: JsonRejection, req_id: String) -> AppError {
    AppError::new(
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        "Invalid request body",
        req_id,
    )
    .with_details(vec![ErrorDetail {
        field: "body".into(),
        issue: rejection.body_text(),
    }])
}

// Non-numeric ids cannot name a quiz, so they are simply not found.
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

async fn load_quiz(state: &AppState, raw_id: &str, req_id: &str) -> Result<QuizRecord, AppError> {
    let id = parse_id(raw_id).ok_or_else(|| AppError::not_found("Quiz not found", req_id))?;
    state
        .store
        .get(id)
        .await
        .map_err(|e| AppError::from_quiz_error(e.into(), req_id))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Test Generator AI API is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn generate_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<QuizRecord>>), AppError> {
    let req_id = request_id_from_headers(&headers);
    let Json(payload) = payload.map_err(|r| body_rejection(r, req_id.clone()))?;

    let record = state
        .assembler
        .assemble(&payload)
        .await
        .map_err(|e| AppError::from_quiz_error(e, req_id.clone()))?;

    info!(request_id = %req_id, quiz_id = record.id, "quiz generated");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(record).with_message("Quiz generated successfully")),
    ))
}

pub async fn list_quizzes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<QuizRecord>>>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let quizzes = state
        .store
        .list()
        .await
        .map_err(|e| AppError::from_quiz_error(e.into(), req_id))?;
    Ok(Json(ApiResponse::data(quizzes)))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<QuizRecord>>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let quiz = load_quiz(&state, &id, &req_id).await?;
    Ok(Json(ApiResponse::data(quiz)))
}

pub async fn delete_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let id = parse_id(&id).ok_or_else(|| AppError::not_found("Quiz not found", req_id.clone()))?;
    state
        .store
        .delete(id)
        .await
        .map_err(|e| AppError::from_quiz_error(e.into(), req_id.clone()))?;
    info!(request_id = %req_id, quiz_id = id, "quiz deleted");
    Ok(Json(ApiResponse {
        success: true,
        message: Some("Quiz deleted successfully"),
        data: None,
    }))
}

pub async fn score_quiz_answers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    payload: Result<Json<AnswerSheet>, JsonRejection>,
) -> Result<Json<ApiResponse<ScoreReport>>, AppError> {
    let req_id = request_id_from_headers(&headers);
    let Json(sheet) = payload.map_err(|r| body_rejection(r, req_id.clone()))?;
    let quiz = load_quiz(&state, &id, &req_id).await?;
    Ok(Json(ApiResponse::data(score_quiz(&quiz, &sheet))))
}

pub async fn route_not_found(headers: HeaderMap, uri: Uri) -> AppError {
    AppError::not_found(
        format!("Route {} not found", uri.path()),
        request_id_from_headers(&headers),
    )
}
