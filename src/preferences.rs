//! Display preferences persisted on the device.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

use crate::store::keys::BLUR_ENABLED;
use crate::store::{KeyValueStore, PersistOutcome};

/// Whether scan images are blurred until tapped. Defaults to on.
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
    blur_enabled: AtomicBool,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            blur_enabled: AtomicBool::new(true),
        }
    }

    pub async fn load(&self) -> bool {
        let enabled = match self.store.get(BLUR_ENABLED).await {
            Ok(Some(raw)) => match raw.as_str() {
                "true" => true,
                "false" => false,
                other => {
                    warn!(value = other, "Unrecognised blur preference, using default");
                    true
                }
            },
            Ok(None) => true,
            Err(e) => {
                warn!(error = %e, "Failed to read blur preference, using default");
                true
            }
        };
        self.blur_enabled.store(enabled, Ordering::SeqCst);
        enabled
    }

    pub fn blur_enabled(&self) -> bool {
        self.blur_enabled.load(Ordering::SeqCst)
    }

    pub async fn set_blur_enabled(&self, enabled: bool) -> PersistOutcome {
        let value = if enabled { "true" } else { "false" };
        let outcome =
            PersistOutcome::from_result("set_blur_enabled", self.store.set(BLUR_ENABLED, value).await);
        self.blur_enabled.store(enabled, Ordering::SeqCst);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn defaults_to_enabled() {
        let prefs = PreferenceStore::new(Arc::new(MemoryStore::new()));
        assert!(prefs.load().await);
    }

    #[tokio::test]
    async fn garbage_value_falls_back_to_default() {
        let prefs = PreferenceStore::new(Arc::new(MemoryStore::with_entries([(BLUR_ENABLED, "maybe")])));
        assert!(prefs.load().await);
    }

    #[tokio::test]
    async fn set_persists_and_reloads() {
        let store = Arc::new(MemoryStore::new());
        let prefs = PreferenceStore::new(store.clone());
        assert!(prefs.set_blur_enabled(false).await.is_written());
        assert!(!prefs.blur_enabled());

        let reloaded = PreferenceStore::new(store);
        assert!(!reloaded.load().await);
    }

    #[tokio::test]
    async fn write_failure_keeps_in_memory_choice() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let prefs = PreferenceStore::new(store);

        assert!(prefs.set_blur_enabled(false).await.error().is_some());
        assert!(!prefs.blur_enabled());
    }
}
