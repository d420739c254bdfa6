//! OnboardingMachine — keeps the persisted onboarding flags and the
//! in-memory runtime state consistent.
//!
//! The machine is constructed once at app start and shared by reference.
//! State is published through a `watch` channel so screens can subscribe
//! instead of re-reading the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{OnceCell, watch};
use tracing::{debug, info, warn};

use crate::store::keys::{self, HAS_BEEN_AUTHENTICATED, ONBOARDING_COMPLETE};
use crate::store::{KeyValueStore, PersistOutcome};

use super::state::{NavigationTarget, OnboardingRuntimeState, OnboardingView, UserKind};

pub struct OnboardingMachine {
    store: Arc<dyn KeyValueStore>,
    view: watch::Sender<OnboardingView>,
    loaded: OnceCell<UserKind>,
    attached: AtomicBool,
}

impl OnboardingMachine {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (view, _rx) = watch::channel(OnboardingView::Loading);
        Self {
            store,
            view,
            loaded: OnceCell::new(),
            attached: AtomicBool::new(true),
        }
    }

    /// Read the persisted flags and commit the initial state.
    ///
    /// Runs once; later calls wait for (or return) the first result. Read
    /// failures fail closed to [`UserKind::NewUser`].
    pub async fn load(&self) -> UserKind {
        *self.loaded.get_or_init(|| self.initial_load()).await
    }

    async fn initial_load(&self) -> UserKind {
        let (complete, authenticated) = futures::future::join(
            self.store.get(ONBOARDING_COMPLETE),
            self.store.get(HAS_BEEN_AUTHENTICATED),
        )
        .await;

        let kind = match (complete, authenticated) {
            (Ok(complete), Ok(authenticated)) => {
                UserKind::classify(is_true(complete.as_deref()), is_true(authenticated.as_deref()))
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to read onboarding flags, starting as new user");
                UserKind::NewUser
            }
        };

        if kind == UserKind::AbandonedOnboarding {
            // Finished onboarding without ever signing in: send them through
            // again. hasBeenAuthenticated is never touched here.
            let _ = PersistOutcome::from_result(
                "clear_abandoned_onboarding",
                self.store.remove(ONBOARDING_COMPLETE).await,
            );
        }

        if !self.is_attached() {
            debug!("Onboarding machine detached during load, discarding result");
            return kind;
        }

        self.view.send_replace(OnboardingView::Ready(OnboardingRuntimeState::from_kind(kind)));
        info!(user_kind = %kind, "Onboarding state loaded");
        kind
    }

    /// Current view; `Loading` until [`load`](Self::load) has committed.
    pub fn view(&self) -> OnboardingView {
        self.view.borrow().clone()
    }

    /// Current runtime state, if loaded.
    pub fn state(&self) -> Option<OnboardingRuntimeState> {
        self.view.borrow().ready().cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingView> {
        self.view.subscribe()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Stop applying results. Writes already in flight still reach the
    /// store, but their in-memory effects are dropped.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
        debug!("Onboarding machine detached");
    }

    /// Mark onboarding finished and choose where the main app opens.
    pub async fn complete_onboarding(&self, navigate_to: NavigationTarget) -> PersistOutcome {
        let outcome = PersistOutcome::from_result(
            "complete_onboarding",
            self.store.set(ONBOARDING_COMPLETE, "true").await,
        );
        self.update("complete_onboarding", |state| {
            state.navigation_target = navigate_to;
            state.has_completed_onboarding = true;
            if state.user_kind != UserKind::ReturningKnownUser {
                state.user_kind = UserKind::OnboardedThisSession;
            }
            true
        });
        info!(navigate_to = %navigate_to, "Onboarding completed");
        outcome
    }

    /// Skip onboarding for a user who turned out to be signed in already.
    /// Memory only; the persisted completion flag is left alone.
    pub fn force_skip_onboarding(&self) {
        self.update("force_skip_onboarding", |state| {
            if state.has_completed_onboarding {
                return false;
            }
            state.has_completed_onboarding = true;
            if state.user_kind != UserKind::ReturningKnownUser {
                state.user_kind = UserKind::OnboardedThisSession;
            }
            true
        });
    }

    /// Development reset: clear both flags and return to new-user defaults.
    pub async fn reset_onboarding(&self) -> PersistOutcome {
        let outcome = PersistOutcome::from_result(
            "reset_onboarding",
            self.store.multi_remove(&keys::ONBOARDING_FLAGS).await,
        );
        self.update("reset_onboarding", |state| {
            *state = OnboardingRuntimeState::default();
            true
        });
        info!("Onboarding reset");
        outcome
    }

    /// Latch auth history. Only a reset or a full wipe clears it again.
    pub async fn mark_user_as_authenticated(&self) -> PersistOutcome {
        let outcome = PersistOutcome::from_result(
            "mark_user_as_authenticated",
            self.store.set(HAS_BEEN_AUTHENTICATED, "true").await,
        );
        self.update("mark_user_as_authenticated", |state| {
            let changed = !state.has_authentication_history || state.should_show_re_sign_in_modal;
            state.has_authentication_history = true;
            state.should_show_re_sign_in_modal = false;
            changed
        });
        outcome
    }

    /// "Start over as a new user": drop every trace of the previous identity.
    pub async fn clear_unauthenticated_data(&self) -> PersistOutcome {
        let outcome = PersistOutcome::from_result(
            "clear_unauthenticated_data",
            self.store.multi_remove(&keys::UNAUTHENTICATED_WIPE).await,
        );
        self.update("clear_unauthenticated_data", |state| {
            *state = OnboardingRuntimeState::default();
            true
        });
        info!("Local data cleared");
        outcome
    }

    pub fn dismiss_re_sign_in_modal(&self) {
        self.update("dismiss_re_sign_in_modal", |state| {
            let changed = state.should_show_re_sign_in_modal || !state.re_sign_in_modal_was_dismissed;
            state.should_show_re_sign_in_modal = false;
            state.re_sign_in_modal_was_dismissed = true;
            changed
        });
    }

    /// Converge the modal flag for the given auth status. Subscribers are
    /// only notified when the flag actually changes. Returns the flag.
    pub fn check_and_set_re_sign_in_modal(&self, is_authenticated: bool) -> bool {
        let mut visible = false;
        self.update("check_and_set_re_sign_in_modal", |state| {
            visible = state.wants_re_sign_in_modal(is_authenticated);
            if state.should_show_re_sign_in_modal == visible {
                return false;
            }
            state.should_show_re_sign_in_modal = visible;
            debug!(visible, is_authenticated, "Re-sign-in modal toggled");
            true
        });
        visible
    }

    /// Re-arm the modal so a later sign-out prompts again.
    pub fn reset_re_sign_in_modal_dismissed(&self) {
        self.update("reset_re_sign_in_modal_dismissed", |state| {
            let changed = state.re_sign_in_modal_was_dismissed;
            state.re_sign_in_modal_was_dismissed = false;
            changed
        });
    }

    /// Apply `f` to the loaded state. `f` returns whether anything changed.
    fn update<F>(&self, op: &str, f: F)
    where
        F: FnOnce(&mut OnboardingRuntimeState) -> bool,
    {
        if !self.is_attached() {
            debug!(op, "Onboarding machine detached, dropping state update");
            return;
        }
        self.view.send_if_modified(|view| match view {
            OnboardingView::Ready(state) => f(state),
            OnboardingView::Loading => {
                warn!(op, "Onboarding state not loaded yet, ignoring in-memory update");
                false
            }
        });
    }
}

fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::MemoryStore;

    fn machine_with(store: MemoryStore) -> (Arc<MemoryStore>, OnboardingMachine) {
        let store = Arc::new(store);
        let machine = OnboardingMachine::new(store.clone());
        (store, machine)
    }

    async fn loaded(store: MemoryStore) -> (Arc<MemoryStore>, OnboardingMachine) {
        let (store, machine) = machine_with(store);
        machine.load().await;
        (store, machine)
    }

    #[tokio::test]
    async fn view_is_loading_until_load() {
        let (_store, machine) = machine_with(MemoryStore::new());
        assert_eq!(machine.view(), OnboardingView::Loading);
        assert!(machine.state().is_none());

        machine.load().await;
        assert!(machine.state().is_some());
    }

    #[tokio::test]
    async fn new_device_then_complete_to_camera() {
        let (store, machine) = loaded(MemoryStore::new()).await;

        let state = machine.state().unwrap();
        assert_eq!(state.user_kind, UserKind::NewUser);
        assert!(!state.has_completed_onboarding);
        assert_eq!(state.navigation_target, NavigationTarget::Home);

        assert!(machine.complete_onboarding(NavigationTarget::Camera).await.is_written());

        let state = machine.state().unwrap();
        assert!(state.has_completed_onboarding);
        assert_eq!(state.navigation_target, NavigationTarget::Camera);
        assert_eq!(state.user_kind, UserKind::OnboardedThisSession);
        assert_eq!(
            store.get(ONBOARDING_COMPLETE).await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn complete_twice_only_overwrites_target() {
        let (store, machine) = loaded(MemoryStore::new()).await;
        let _ = machine.complete_onboarding(NavigationTarget::Camera).await;
        let _ = machine.complete_onboarding(NavigationTarget::Home).await;

        let state = machine.state().unwrap();
        assert!(state.has_completed_onboarding);
        assert_eq!(state.navigation_target, NavigationTarget::Home);
        assert_eq!(store.dump().await.len(), 1);
    }

    #[tokio::test]
    async fn auth_history_wins_regardless_of_completion_flag() {
        for complete in [None, Some("true"), Some("false"), Some("garbage")] {
            let mut entries = vec![(HAS_BEEN_AUTHENTICATED, "true")];
            if let Some(value) = complete {
                entries.push((ONBOARDING_COMPLETE, value));
            }
            let (_store, machine) = loaded(MemoryStore::with_entries(entries)).await;

            let state = machine.state().unwrap();
            assert_eq!(state.user_kind, UserKind::ReturningKnownUser);
            assert!(state.has_completed_onboarding, "complete flag {complete:?}");
            assert!(state.has_authentication_history);
            // Deferred until auth status is known.
            assert!(!state.should_show_re_sign_in_modal);
        }
    }

    #[tokio::test]
    async fn abandoned_onboarding_is_wiped() {
        let (store, machine) =
            loaded(MemoryStore::with_entries([(ONBOARDING_COMPLETE, "true")])).await;

        let state = machine.state().unwrap();
        assert_eq!(state.user_kind, UserKind::AbandonedOnboarding);
        assert!(!state.has_completed_onboarding);
        assert_eq!(store.get(ONBOARDING_COMPLETE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn abandoned_onboarding_with_false_auth_flag_keeps_auth_flag() {
        let (store, machine) = loaded(MemoryStore::with_entries([
            (ONBOARDING_COMPLETE, "true"),
            (HAS_BEEN_AUTHENTICATED, "false"),
        ]))
        .await;

        assert_eq!(machine.state().unwrap().user_kind, UserKind::AbandonedOnboarding);
        assert_eq!(
            store.get(HAS_BEEN_AUTHENTICATED).await.unwrap().as_deref(),
            Some("false")
        );
    }

    #[tokio::test]
    async fn read_failure_fails_closed_to_new_user() {
        let store = MemoryStore::with_entries([(HAS_BEEN_AUTHENTICATED, "true")]);
        store.set_fail_reads(true);
        let (_store, machine) = loaded(store).await;

        let state = machine.state().unwrap();
        assert_eq!(state.user_kind, UserKind::NewUser);
        assert!(!state.has_completed_onboarding);
    }

    #[tokio::test]
    async fn load_runs_once() {
        let (store, machine) = loaded(MemoryStore::new()).await;
        store.set(HAS_BEEN_AUTHENTICATED, "true").await.unwrap();

        assert_eq!(machine.load().await, UserKind::NewUser);
        assert!(!machine.state().unwrap().has_authentication_history);
    }

    #[tokio::test]
    async fn re_sign_in_modal_follows_auth_status() {
        let (_store, machine) =
            loaded(MemoryStore::with_entries([(HAS_BEEN_AUTHENTICATED, "true")])).await;

        assert!(machine.check_and_set_re_sign_in_modal(false));
        assert!(machine.state().unwrap().should_show_re_sign_in_modal);

        assert!(!machine.check_and_set_re_sign_in_modal(true));
        assert!(!machine.state().unwrap().should_show_re_sign_in_modal);
    }

    #[tokio::test]
    async fn repeated_checks_do_not_notify() {
        let (_store, machine) =
            loaded(MemoryStore::with_entries([(HAS_BEEN_AUTHENTICATED, "true")])).await;
        machine.check_and_set_re_sign_in_modal(false);

        let mut rx = machine.subscribe();
        rx.borrow_and_update();
        machine.check_and_set_re_sign_in_modal(false);
        machine.check_and_set_re_sign_in_modal(false);
        assert!(!rx.has_changed().unwrap());

        machine.check_and_set_re_sign_in_modal(true);
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn dismissal_suppresses_modal_until_reset() {
        let (_store, machine) =
            loaded(MemoryStore::with_entries([(HAS_BEEN_AUTHENTICATED, "true")])).await;
        machine.check_and_set_re_sign_in_modal(false);

        machine.dismiss_re_sign_in_modal();
        let state = machine.state().unwrap();
        assert!(!state.should_show_re_sign_in_modal);
        assert!(state.re_sign_in_modal_was_dismissed);

        for _ in 0..3 {
            assert!(!machine.check_and_set_re_sign_in_modal(false));
        }

        machine.reset_re_sign_in_modal_dismissed();
        assert!(machine.check_and_set_re_sign_in_modal(false));
    }

    #[tokio::test]
    async fn new_user_never_sees_modal() {
        let (_store, machine) = loaded(MemoryStore::new()).await;
        assert!(!machine.check_and_set_re_sign_in_modal(false));
    }

    #[tokio::test]
    async fn mark_authenticated_latches_and_hides_modal() {
        let (store, machine) =
            loaded(MemoryStore::with_entries([(HAS_BEEN_AUTHENTICATED, "true")])).await;
        machine.check_and_set_re_sign_in_modal(false);

        assert!(machine.mark_user_as_authenticated().await.is_written());
        let state = machine.state().unwrap();
        assert!(state.has_authentication_history);
        assert!(!state.should_show_re_sign_in_modal);
        assert_eq!(
            store.get(HAS_BEEN_AUTHENTICATED).await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn clear_unauthenticated_data_removes_all_six_keys() {
        let mut entries: Vec<(&str, &str)> = keys::UNAUTHENTICATED_WIPE
            .iter()
            .map(|k| (*k, "x"))
            .collect();
        entries.push((HAS_BEEN_AUTHENTICATED, "true"));
        entries.push((keys::BLUR_ENABLED, "false"));
        let (store, machine) = loaded(MemoryStore::with_entries(entries)).await;
        machine.check_and_set_re_sign_in_modal(false);

        assert!(machine.clear_unauthenticated_data().await.is_written());

        let remaining = store.dump().await;
        for key in keys::UNAUTHENTICATED_WIPE {
            assert!(!remaining.contains_key(key), "{key} should be removed");
        }
        assert!(remaining.contains_key(keys::BLUR_ENABLED));

        let state = machine.state().unwrap();
        assert_eq!(state, OnboardingRuntimeState::default());
    }

    #[tokio::test]
    async fn reset_onboarding_clears_flags() {
        let (store, machine) =
            loaded(MemoryStore::with_entries([(HAS_BEEN_AUTHENTICATED, "true")])).await;
        let _ = machine.complete_onboarding(NavigationTarget::Camera).await;

        let _ = machine.reset_onboarding().await;
        assert!(store.dump().await.is_empty());
        assert_eq!(machine.state().unwrap(), OnboardingRuntimeState::default());
    }

    #[tokio::test]
    async fn force_skip_does_not_persist() {
        let (store, machine) = loaded(MemoryStore::new()).await;
        machine.force_skip_onboarding();

        assert!(machine.state().unwrap().has_completed_onboarding);
        assert_eq!(store.get(ONBOARDING_COMPLETE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_failure_is_reported_but_state_still_applies() {
        let (store, machine) = loaded(MemoryStore::new()).await;
        store.set_fail_writes(true);

        let outcome = machine.complete_onboarding(NavigationTarget::Camera).await;
        assert!(outcome.error().is_some());
        assert!(machine.state().unwrap().has_completed_onboarding);
        assert_eq!(store.get(ONBOARDING_COMPLETE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn detached_machine_ignores_late_results() {
        let (store, machine) = loaded(MemoryStore::new()).await;
        machine.detach();

        let _ = machine.complete_onboarding(NavigationTarget::Camera).await;
        assert!(!machine.state().unwrap().has_completed_onboarding);
        // The write itself still lands.
        assert_eq!(
            store.get(ONBOARDING_COMPLETE).await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn detach_during_in_flight_load_discards_result() {
        let store = MemoryStore::with_entries([(HAS_BEEN_AUTHENTICATED, "true")]);
        store.set_read_delay(Duration::from_millis(200));
        let (_store, machine) = machine_with(store);
        let machine = Arc::new(machine);

        let loading = {
            let machine = Arc::clone(&machine);
            tokio::spawn(async move { machine.load().await })
        };

        // Let the load start and park on the delayed reads.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(machine.is_attached());
        machine.detach();

        assert_eq!(loading.await.unwrap(), UserKind::ReturningKnownUser);
        assert_eq!(machine.view(), OnboardingView::Loading);
    }

    #[tokio::test]
    async fn detached_before_load_stays_loading() {
        let (_store, machine) = machine_with(MemoryStore::new());
        machine.detach();
        machine.load().await;
        assert_eq!(machine.view(), OnboardingView::Loading);
    }
}
