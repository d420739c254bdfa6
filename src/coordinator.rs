//! Coordinator — mediates between the auth session and the onboarding
//! machine so neither depends on the other's internals.
//!
//! It subscribes to auth status changes, latches auth history on the edge
//! into "signed in", and keeps the re-sign-in modal in step with the live
//! status. It also owns the two modal actions.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};

use crate::auth::{AuthMode, AuthSession, AuthStatus};
use crate::onboarding::OnboardingMachine;
use crate::quiz::QuizAnswerStore;
use crate::store::PersistOutcome;

pub struct Coordinator {
    machine: Arc<OnboardingMachine>,
    quiz: Arc<QuizAnswerStore>,
    session: Arc<AuthSession>,
    sign_in_delay: Duration,
    last_seen: Mutex<Option<AuthStatus>>,
}

impl Coordinator {
    pub fn new(
        machine: Arc<OnboardingMachine>,
        quiz: Arc<QuizAnswerStore>,
        session: Arc<AuthSession>,
        sign_in_delay: Duration,
    ) -> Self {
        Self {
            machine,
            quiz,
            session,
            sign_in_delay,
            last_seen: Mutex::new(None),
        }
    }

    /// React to one auth status. Returns true when this status was the edge
    /// into "signed in" and auth history was latched.
    pub async fn observe(&self, status: AuthStatus) -> bool {
        let previous = self.last_seen.lock().await.replace(status);
        if status.is_loading {
            return false;
        }

        let entered_authenticated = status.is_authenticated
            && previous.is_none_or(|p| p.is_loading || !p.is_authenticated);
        if entered_authenticated {
            let _ = self.machine.mark_user_as_authenticated().await;
        }

        self.machine
            .check_and_set_re_sign_in_modal(status.is_authenticated);
        entered_authenticated
    }

    /// Run the subscription loop on a tokio task.
    ///
    /// Waits for the onboarding flags first so the modal decision is never
    /// made against unloaded state. Stops when the session is dropped or
    /// the machine is detached.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut statuses = WatchStream::new(self.session.subscribe());
        tokio::spawn(async move {
            this.machine.load().await;
            while let Some(status) = statuses.next().await {
                if !this.machine.is_attached() {
                    break;
                }
                this.observe(status).await;
            }
            debug!("Coordinator stopped");
        })
    }

    /// "Sign back in": close the modal, re-arm it for a later sign-out, and
    /// open the login form once the dismissal has settled.
    pub async fn handle_sign_back_in(&self) {
        self.machine.dismiss_re_sign_in_modal();
        self.machine.reset_re_sign_in_modal_dismissed();

        tokio::time::sleep(self.sign_in_delay).await;

        if !self.machine.is_attached() {
            return;
        }
        self.session.request_overlay(true, AuthMode::Login);
        info!("Login overlay requested");
    }

    /// "Clear data and start over": wipe local identity, then close the modal.
    ///
    /// The wipe removes the quiz key from the store; the in-memory answers
    /// are dropped too so a later update cannot write them back.
    pub async fn handle_clear_data_and_start_over(&self) -> PersistOutcome {
        let outcome = self.machine.clear_unauthenticated_data().await;
        self.quiz.reset_in_memory().await;
        self.machine.dismiss_re_sign_in_modal();
        outcome
    }
}
