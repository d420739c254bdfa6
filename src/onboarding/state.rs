//! Onboarding runtime state — what the UI needs to decide the next screen.

use serde::{Deserialize, Serialize};

/// Which screen stack the main app opens on after onboarding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    #[default]
    Home,
    Camera,
}

impl std::fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Camera => write!(f, "camera"),
        }
    }
}

/// Classification of the device's user, derived from persisted flags at load
/// time and updated by explicit onboarding actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    /// No completion flag and no auth history.
    #[default]
    NewUser,
    /// Finished onboarding on an earlier launch but never signed in. The
    /// completion flag is wiped so the user goes through onboarding again.
    AbandonedOnboarding,
    /// Has signed in on this device before; onboarding counts as done.
    ReturningKnownUser,
    /// Completed (or was force-skipped through) onboarding in this process.
    OnboardedThisSession,
}

impl UserKind {
    /// Classify from the two persisted flags.
    pub fn classify(onboarding_complete: bool, has_been_authenticated: bool) -> Self {
        if has_been_authenticated {
            Self::ReturningKnownUser
        } else if onboarding_complete {
            Self::AbandonedOnboarding
        } else {
            Self::NewUser
        }
    }
}

impl std::fmt::Display for UserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NewUser => "new_user",
            Self::AbandonedOnboarding => "abandoned_onboarding",
            Self::ReturningKnownUser => "returning_known_user",
            Self::OnboardedThisSession => "onboarded_this_session",
        };
        write!(f, "{s}")
    }
}

/// In-memory onboarding state. Never persisted as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRuntimeState {
    pub user_kind: UserKind,
    pub has_completed_onboarding: bool,
    pub navigation_target: NavigationTarget,
    pub has_authentication_history: bool,
    pub should_show_re_sign_in_modal: bool,
    /// Session-local latch, cleared only by an explicit reset or a restart.
    pub re_sign_in_modal_was_dismissed: bool,
}

impl OnboardingRuntimeState {
    /// State right after the initial load, before any auth status is known.
    pub fn from_kind(kind: UserKind) -> Self {
        let returning = kind == UserKind::ReturningKnownUser;
        Self {
            user_kind: kind,
            has_completed_onboarding: returning,
            has_authentication_history: returning,
            ..Self::default()
        }
    }

    /// Re-sign-in decision: show iff the device has auth history, the user
    /// is signed out, and the prompt was not dismissed this session.
    pub fn wants_re_sign_in_modal(&self, is_authenticated: bool) -> bool {
        self.has_authentication_history && !is_authenticated && !self.re_sign_in_modal_was_dismissed
    }
}

/// What consumers see. `Loading` is a distinct renderable state so the UI
/// never flashes the new-user flow before the flags are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "state", rename_all = "snake_case")]
pub enum OnboardingView {
    Loading,
    Ready(OnboardingRuntimeState),
}

impl OnboardingView {
    pub fn ready(&self) -> Option<&OnboardingRuntimeState> {
        match self {
            Self::Loading => None,
            Self::Ready(state) => Some(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_all_flag_combinations() {
        assert_eq!(UserKind::classify(false, false), UserKind::NewUser);
        assert_eq!(UserKind::classify(true, false), UserKind::AbandonedOnboarding);
        assert_eq!(UserKind::classify(false, true), UserKind::ReturningKnownUser);
        assert_eq!(UserKind::classify(true, true), UserKind::ReturningKnownUser);
    }

    #[test]
    fn from_kind_only_marks_returning_users_complete() {
        let returning = OnboardingRuntimeState::from_kind(UserKind::ReturningKnownUser);
        assert!(returning.has_completed_onboarding);
        assert!(returning.has_authentication_history);
        assert!(!returning.should_show_re_sign_in_modal);

        for kind in [UserKind::NewUser, UserKind::AbandonedOnboarding] {
            let state = OnboardingRuntimeState::from_kind(kind);
            assert!(!state.has_completed_onboarding, "{kind} should not be complete");
            assert!(!state.has_authentication_history);
            assert_eq!(state.navigation_target, NavigationTarget::Home);
        }
    }

    #[test]
    fn re_sign_in_decision_table() {
        let mut state = OnboardingRuntimeState::from_kind(UserKind::ReturningKnownUser);
        assert!(state.wants_re_sign_in_modal(false));
        assert!(!state.wants_re_sign_in_modal(true));

        state.re_sign_in_modal_was_dismissed = true;
        assert!(!state.wants_re_sign_in_modal(false));

        let fresh = OnboardingRuntimeState::default();
        assert!(!fresh.wants_re_sign_in_modal(false));
    }

    #[test]
    fn display_matches_serde() {
        let kinds = [
            UserKind::NewUser,
            UserKind::AbandonedOnboarding,
            UserKind::ReturningKnownUser,
            UserKind::OnboardedThisSession,
        ];
        for kind in kinds {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(format!("\"{kind}\""), json, "Display and serde should match for {kind:?}");
        }
        for target in [NavigationTarget::Home, NavigationTarget::Camera] {
            let json = serde_json::to_string(&target).unwrap();
            assert_eq!(format!("\"{target}\""), json);
        }
    }

    #[test]
    fn view_serializes_with_status_tag() {
        let loading = serde_json::to_value(OnboardingView::Loading).unwrap();
        assert_eq!(loading["status"], "loading");

        let ready = serde_json::to_value(OnboardingView::Ready(OnboardingRuntimeState::default())).unwrap();
        assert_eq!(ready["status"], "ready");
        assert_eq!(ready["state"]["hasCompletedOnboarding"], false);
        assert_eq!(ready["state"]["navigationTarget"], "home");
    }
}
