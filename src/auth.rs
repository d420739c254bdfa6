//! Auth session state as seen by the onboarding layer.
//!
//! Authentication itself happens elsewhere; this type only carries the live
//! status and the request to show or hide the auth overlay. Both are
//! published through `watch` channels so observers react to changes.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Live auth status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Default for AuthStatus {
    /// A fresh process has not checked its stored token yet.
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
        }
    }
}

impl AuthStatus {
    pub fn resolved(is_authenticated: bool) -> Self {
        Self {
            is_authenticated,
            is_loading: false,
        }
    }
}

/// Which screen the auth overlay opens on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMode {
    /// Pick Apple / Google / email.
    #[default]
    MethodSelection,
    /// Straight to the login form.
    Login,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOverlay {
    pub visible: bool,
    pub mode: AuthMode,
}

pub struct AuthSession {
    status: watch::Sender<AuthStatus>,
    overlay: watch::Sender<AuthOverlay>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession {
    pub fn new() -> Self {
        let (status, _) = watch::channel(AuthStatus::default());
        let (overlay, _) = watch::channel(AuthOverlay::default());
        Self { status, overlay }
    }

    pub fn status(&self) -> AuthStatus {
        *self.status.borrow()
    }

    /// Publish a new status. Subscribers are woken only on an actual change.
    pub fn set_status(&self, status: AuthStatus) {
        let changed = self.status.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
        if changed {
            debug!(
                is_authenticated = status.is_authenticated,
                is_loading = status.is_loading,
                "Auth status changed"
            );
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.status.subscribe()
    }

    pub fn overlay(&self) -> AuthOverlay {
        *self.overlay.borrow()
    }

    pub fn request_overlay(&self, visible: bool, mode: AuthMode) {
        self.overlay.send_replace(AuthOverlay { visible, mode });
    }
}
