//! QuizAnswerStore — accumulates partial answers and mirrors every change to
//! the key-value store so the quiz can resume after a restart.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::store::keys::QUIZ_ANSWERS;
use crate::store::{KeyValueStore, PersistOutcome};

use super::model::QuizAnswers;

pub struct QuizAnswerStore {
    store: Arc<dyn KeyValueStore>,
    // Held across the store write so overlapping updates merge onto the
    // latest answers, one at a time.
    answers: Mutex<QuizAnswers>,
}

impl QuizAnswerStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            answers: Mutex::new(QuizAnswers::default()),
        }
    }

    /// Load persisted answers. Missing or unreadable data yields empty answers.
    pub async fn load_answers(&self) -> QuizAnswers {
        let mut answers = self.answers.lock().await;
        *answers = match self.store.get(QUIZ_ANSWERS).await {
            Ok(Some(raw)) => match serde_json::from_str::<QuizAnswers>(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, "Stored quiz answers are corrupt, starting empty");
                    QuizAnswers::default()
                }
            },
            Ok(None) => QuizAnswers::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read quiz answers, starting empty");
                QuizAnswers::default()
            }
        };
        answers.clone()
    }

    /// Current in-memory answers.
    pub async fn answers(&self) -> QuizAnswers {
        self.answers.lock().await.clone()
    }

    /// Shallow-merge `partial` into the current answers and persist the
    /// result. The write is issued before the merged value is committed.
    pub async fn update_answers(&self, partial: QuizAnswers) -> (QuizAnswers, PersistOutcome) {
        let mut answers = self.answers.lock().await;
        let mut merged = answers.clone();
        merged.merge(partial);

        let result = match serde_json::to_string(&merged) {
            Ok(json) => self.store.set(QUIZ_ANSWERS, &json).await,
            Err(e) => Err(StorageError::from(e)),
        };
        let outcome = PersistOutcome::from_result("update_answers", result);

        *answers = merged.clone();
        debug!(written = outcome.is_written(), "Quiz answers updated");
        (merged, outcome)
    }

    /// Forget the in-memory answers after the store key was removed by a
    /// wider wipe, so the next update starts from nothing.
    pub async fn reset_in_memory(&self) {
        *self.answers.lock().await = QuizAnswers::default();
        debug!("Quiz answers reset in memory");
    }

    /// Forget every answer, in memory and in the store.
    pub async fn clear_answers(&self) -> PersistOutcome {
        let mut answers = self.answers.lock().await;
        let outcome =
            PersistOutcome::from_result("clear_answers", self.store.remove(QUIZ_ANSWERS).await);
        *answers = QuizAnswers::default();
        outcome
    }
}
