//! REST endpoints for quiz answers.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::flow::QuizStep;
use super::model::QuizAnswers;
use super::store::QuizAnswerStore;

#[derive(Clone)]
pub struct QuizRouteState {
    pub quiz: Arc<QuizAnswerStore>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub answers: QuizAnswers,
    /// Where the quiz should resume.
    pub next_step: QuizStep,
    pub persisted: bool,
}

impl QuizResponse {
    fn new(answers: QuizAnswers, persisted: bool) -> Self {
        Self {
            next_step: QuizStep::resume_point(&answers),
            answers,
            persisted,
        }
    }
}

/// GET /api/quiz
async fn get_answers(State(state): State<QuizRouteState>) -> impl IntoResponse {
    Json(QuizResponse::new(state.quiz.answers().await, true))
}

/// PATCH /api/quiz — shallow-merge a partial answer set.
async fn patch_answers(
    State(state): State<QuizRouteState>,
    Json(partial): Json<QuizAnswers>,
) -> impl IntoResponse {
    let (merged, outcome) = state.quiz.update_answers(partial).await;
    Json(QuizResponse::new(merged, outcome.is_written()))
}

/// DELETE /api/quiz
async fn clear_answers(State(state): State<QuizRouteState>) -> impl IntoResponse {
    let outcome = state.quiz.clear_answers().await;
    Json(QuizResponse::new(QuizAnswers::default(), outcome.is_written()))
}

pub fn quiz_routes(state: QuizRouteState) -> Router {
    Router::new()
        .route(
            "/api/quiz",
            get(get_answers).patch(patch_answers).delete(clear_answers),
        )
        .with_state(state)
}
