use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::{debug, info, warn};

use crate::host::{PopupWindow, WindowFeatures, WindowOpener};
use crate::observability::metrics::get_metrics;

static POPUP_REGISTRY_INSTANCE: OnceLock<PopupRegistry> = OnceLock::new();

/// Destination URL -> open window handle.
///
/// Closed windows are dropped the next time their URL is looked up.
/// `PopupRegistry::global()` is shared by every widget in the process.
#[derive(Clone, Default)]
pub struct PopupRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<dyn PopupWindow>>>>,
}

impl PopupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Self {
        POPUP_REGISTRY_INSTANCE
            .get_or_init(|| {
                info!("Initializing static PopupRegistry...");
                PopupRegistry::new()
            })
            .clone()
    }

    /// Number of registered windows that are still open.
    pub fn live_count(&self) -> usize {
        self.lock().values().filter(|window| !window.is_closed()).count()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<dyn PopupWindow>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupOutcome {
    /// empty destination
    Ignored,
    /// a live window for the destination existed and was focused
    Focused,
    Opened,
    /// the host refused to open a window
    Blocked,
}

/// Opens or refocuses one window per destination URL.
#[derive(Clone)]
pub struct PopupManager {
    registry: PopupRegistry,
    opener: Arc<dyn WindowOpener>,
    features: WindowFeatures,
}

impl PopupManager {
    pub fn new(registry: PopupRegistry, opener: Arc<dyn WindowOpener>, features: WindowFeatures) -> Self {
        Self { registry, opener, features }
    }

    pub fn open(&self, url: &str) -> PopupOutcome {
        if url.is_empty() {
            return PopupOutcome::Ignored;
        }
        let popups = &get_metrics().popups;

        // lookup and insert under one lock so two opens of the same URL cannot both open
        let mut windows = self.registry.lock();
        let live = windows.get(url).filter(|window| !window.is_closed()).cloned();
        if let Some(window) = live {
            debug!("focusing popup for {}", url);
            window.focus();
            popups.with_label_values(&["focused"]).inc();
            return PopupOutcome::Focused;
        }
        windows.remove(url);

        match self.opener.open(url, url, Some(self.features)) {
            Some(window) => {
                info!("opened popup for {} ({})", url, self.features.as_feature_string());
                windows.insert(url.to_owned(), window);
                popups.with_label_values(&["opened"]).inc();
                PopupOutcome::Opened
            }
            None => {
                warn!("popup for {} was blocked", url);
                popups.with_label_values(&["blocked"]).inc();
                PopupOutcome::Blocked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryWindowOpener;

    const FEATURES: WindowFeatures = WindowFeatures { width: 646, height: 436 };

    #[test]
    fn second_open_focuses_the_live_window() {
        let opener = Arc::new(MemoryWindowOpener::new());
        let manager = PopupManager::new(PopupRegistry::new(), opener.clone(), FEATURES);

        assert_eq!(manager.open("https://x.test/share"), PopupOutcome::Opened);
        assert_eq!(manager.open("https://x.test/share"), PopupOutcome::Focused);

        let opened = opener.opened();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].window.focus_count(), 1);
        assert_eq!(opened[0].features, Some(FEATURES));
    }

    #[test]
    fn closed_window_is_replaced() {
        let opener = Arc::new(MemoryWindowOpener::new());
        let registry = PopupRegistry::new();
        let manager = PopupManager::new(registry.clone(), opener.clone(), FEATURES);

        manager.open("https://x.test/a");
        opener.opened()[0].window.close();
        assert_eq!(registry.live_count(), 0);

        assert_eq!(manager.open("https://x.test/a"), PopupOutcome::Opened);
        assert_eq!(opener.opened().len(), 2);
        assert_eq!(registry.live_count(), 1);
    }

    #[test]
    fn distinct_urls_get_distinct_windows_and_empty_is_ignored() {
        let opener = Arc::new(MemoryWindowOpener::new());
        let manager = PopupManager::new(PopupRegistry::new(), opener.clone(), FEATURES);

        assert_eq!(manager.open(""), PopupOutcome::Ignored);
        manager.open("https://x.test/a");
        manager.open("https://x.test/b");
        assert_eq!(opener.opened().len(), 2);
    }

    #[test]
    fn registry_is_shared_between_managers() {
        let registry = PopupRegistry::new();
        let opener = Arc::new(MemoryWindowOpener::new());
        let first = PopupManager::new(registry.clone(), opener.clone(), FEATURES);
        let second = PopupManager::new(registry, opener.clone(), FEATURES);

        first.open("https://x.test/a");
        assert_eq!(second.open("https://x.test/a"), PopupOutcome::Focused);
    }

    #[test]
    fn blocked_open_is_not_registered() {
        let registry = PopupRegistry::new();
        let manager = PopupManager::new(registry.clone(), Arc::new(MemoryWindowOpener::blocking()), FEATURES);

        assert_eq!(manager.open("https://x.test/a"), PopupOutcome::Blocked);
        assert_eq!(registry.live_count(), 0);
    }
}
