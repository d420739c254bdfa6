//! Application wiring — builds every state container over one shared store
//! and exposes them as a single router.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::auth::AuthSession;
use crate::coordinator::Coordinator;
use crate::onboarding::{OnboardingMachine, OnboardingRouteState, onboarding_routes};
use crate::preferences::PreferenceStore;
use crate::quiz::{QuizAnswerStore, QuizRouteState, quiz_routes};
use crate::store::KeyValueStore;

/// Every long-lived state container, constructed once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub machine: Arc<OnboardingMachine>,
    pub quiz: Arc<QuizAnswerStore>,
    pub preferences: Arc<PreferenceStore>,
    pub session: Arc<AuthSession>,
    pub coordinator: Arc<Coordinator>,
}

impl AppState {
    /// Construct the containers and load persisted state. The returned
    /// state is ready to serve; the coordinator loop is not started yet.
    pub async fn init(store: Arc<dyn KeyValueStore>, sign_in_delay: Duration) -> Self {
        let machine = Arc::new(OnboardingMachine::new(Arc::clone(&store)));
        let quiz = Arc::new(QuizAnswerStore::new(Arc::clone(&store)));
        let preferences = Arc::new(PreferenceStore::new(Arc::clone(&store)));
        let session = Arc::new(AuthSession::new());
        let coordinator = Arc::new(Coordinator::new(
            Arc::clone(&machine),
            Arc::clone(&quiz),
            Arc::clone(&session),
            sign_in_delay,
        ));

        let (kind, answers, blur) =
            tokio::join!(machine.load(), quiz.load_answers(), preferences.load());
        info!(
            user_kind = %kind,
            quiz_empty = answers.is_empty(),
            blur_enabled = blur,
            "Local state loaded"
        );

        Self {
            machine,
            quiz,
            preferences,
            session,
            coordinator,
        }
    }

    /// Tear down: late async results stop applying to memory.
    pub fn shutdown(&self) {
        self.machine.detach();
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurPreference {
    pub blur_enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlurResponse {
    pub blur_enabled: bool,
    /// False when the store rejected the write; the in-memory change still applied.
    pub persisted: bool,
}

/// GET /api/preferences/blur
async fn get_blur(State(prefs): State<Arc<PreferenceStore>>) -> impl IntoResponse {
    Json(BlurResponse {
        blur_enabled: prefs.blur_enabled(),
        persisted: true,
    })
}

/// PUT /api/preferences/blur
async fn put_blur(
    State(prefs): State<Arc<PreferenceStore>>,
    Json(body): Json<BlurPreference>,
) -> impl IntoResponse {
    let outcome = prefs.set_blur_enabled(body.blur_enabled).await;
    Json(BlurResponse {
        blur_enabled: prefs.blur_enabled(),
        persisted: outcome.is_written(),
    })
}

/// Build the full router.
pub fn router(state: &AppState) -> Router {
    let onboarding = onboarding_routes(OnboardingRouteState {
        machine: Arc::clone(&state.machine),
        session: Arc::clone(&state.session),
        coordinator: Arc::clone(&state.coordinator),
    });
    let quiz = quiz_routes(QuizRouteState {
        quiz: Arc::clone(&state.quiz),
    });
    let preferences = Router::new()
        .route("/api/preferences/blur", get(get_blur).put(put_blur))
        .with_state(Arc::clone(&state.preferences));

    onboarding
        .merge(quiz)
        .merge(preferences)
        .layer(CorsLayer::permissive())
}
