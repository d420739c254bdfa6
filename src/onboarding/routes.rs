//! REST endpoints for onboarding status, onboarding actions, and the auth
//! session the onboarding layer watches.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthSession, AuthStatus};
use crate::coordinator::Coordinator;
use crate::store::PersistOutcome;

use super::machine::OnboardingMachine;
use super::state::{NavigationTarget, OnboardingView};

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub machine: Arc<OnboardingMachine>,
    pub session: Arc<AuthSession>,
    pub coordinator: Arc<Coordinator>,
}

/// Response body for onboarding actions.
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    /// False when the store rejected the write; the in-memory change still applied.
    pub persisted: bool,
    pub onboarding: OnboardingView,
}

impl ActionResponse {
    fn new(outcome: Option<PersistOutcome>, machine: &OnboardingMachine) -> Self {
        Self {
            persisted: outcome.is_none_or(|o| o.is_written()),
            onboarding: machine.view(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    #[serde(default)]
    pub navigate_to: NavigationTarget,
}

/// GET /api/onboarding/status
async fn get_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.machine.view())
}

/// POST /api/onboarding/complete
async fn complete(
    State(state): State<OnboardingRouteState>,
    body: Bytes,
) -> Response {
    // An empty body means "complete to the default target".
    let request = if body.is_empty() {
        CompleteRequest::default()
    } else {
        match serde_json::from_slice::<CompleteRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": format!("Invalid request body: {e}")})),
                )
                    .into_response();
            }
        }
    };
    let outcome = state.machine.complete_onboarding(request.navigate_to).await;
    Json(ActionResponse::new(Some(outcome), &state.machine)).into_response()
}

/// POST /api/onboarding/force-skip
async fn force_skip(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.machine.force_skip_onboarding();
    Json(ActionResponse::new(None, &state.machine))
}

/// POST /api/onboarding/reset
async fn reset(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let outcome = state.machine.reset_onboarding().await;
    Json(ActionResponse::new(Some(outcome), &state.machine))
}

/// POST /api/onboarding/clear
///
/// The "clear data and start over" action from the re-sign-in modal.
async fn clear(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let outcome = state.coordinator.handle_clear_data_and_start_over().await;
    Json(ActionResponse::new(Some(outcome), &state.machine))
}

/// POST /api/onboarding/re-sign-in/dismiss
async fn dismiss_re_sign_in(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.machine.dismiss_re_sign_in_modal();
    Json(ActionResponse::new(None, &state.machine))
}

/// POST /api/onboarding/re-sign-in/sign-back-in
///
/// Returns immediately; the login overlay is requested after the configured
/// delay and can be observed via GET /api/auth/overlay.
async fn sign_back_in(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let coordinator = Arc::clone(&state.coordinator);
    tokio::spawn(async move { coordinator.handle_sign_back_in().await });
    (StatusCode::ACCEPTED, Json(state.machine.view()))
}

/// GET /api/auth/session
async fn get_session(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.session.status())
}

/// POST /api/auth/session
///
/// Published by the auth layer whenever its status changes. The coordinator
/// reacts asynchronously.
async fn set_session(
    State(state): State<OnboardingRouteState>,
    Json(status): Json<AuthStatus>,
) -> impl IntoResponse {
    state.session.set_status(status);
    StatusCode::NO_CONTENT
}

/// GET /api/auth/overlay
async fn get_overlay(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.session.overlay())
}

/// Build the onboarding and auth-session routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/complete", post(complete))
        .route("/api/onboarding/force-skip", post(force_skip))
        .route("/api/onboarding/reset", post(reset))
        .route("/api/onboarding/clear", post(clear))
        .route("/api/onboarding/re-sign-in/dismiss", post(dismiss_re_sign_in))
        .route("/api/onboarding/re-sign-in/sign-back-in", post(sign_back_in))
        .route("/api/auth/session", get(get_session).post(set_session))
        .route("/api/auth/overlay", get(get_overlay))
        .with_state(state)
}
