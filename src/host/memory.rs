//! In-process host implementations, used by the CLI and by tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::host::{AddressBar, Clipboard, PopupWindow, WindowFeatures, WindowOpener};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
pub struct MemoryWindow {
    closed: AtomicBool,
    focus_count: AtomicUsize,
}

impl MemoryWindow {
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn focus_count(&self) -> usize {
        self.focus_count.load(Ordering::SeqCst)
    }
}

impl PopupWindow for MemoryWindow {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn focus(&self) {
        self.focus_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct OpenedWindow {
    pub url: String,
    pub name: String,
    pub features: Option<WindowFeatures>,
    pub window: Arc<MemoryWindow>,
}

/// Records every window it opens. `blocking()` refuses every request.
#[derive(Debug, Default)]
pub struct MemoryWindowOpener {
    opened: Mutex<Vec<OpenedWindow>>,
    blocked: bool,
}

impl MemoryWindowOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocking() -> Self {
        Self { opened: Mutex::new(Vec::new()), blocked: true }
    }

    pub fn opened(&self) -> Vec<OpenedWindow> {
        lock(&self.opened).clone()
    }
}

impl WindowOpener for MemoryWindowOpener {
    fn open(&self, url: &str, name: &str, features: Option<WindowFeatures>) -> Option<Arc<dyn PopupWindow>> {
        if self.blocked {
            debug!("window blocked: {}", url);
            return None;
        }
        debug!(
            "opening {} as '{}' [{}]",
            url,
            name,
            features.map(|f| f.as_feature_string()).unwrap_or_default()
        );
        let window = Arc::new(MemoryWindow::default());
        lock(&self.opened).push(OpenedWindow {
            url: url.to_owned(),
            name: name.to_owned(),
            features,
            window: window.clone(),
        });
        Some(window)
    }
}

/// Clipboard whose copy action succeeds or fails on demand.
#[derive(Debug)]
pub struct MemoryClipboard {
    supported: bool,
    copied: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self { supported: true, copied: Mutex::new(Vec::new()) }
    }

    pub fn unsupported() -> Self {
        Self { supported: false, copied: Mutex::new(Vec::new()) }
    }

    pub fn copied(&self) -> Vec<String> {
        lock(&self.copied).clone()
    }
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> bool {
        if self.supported {
            lock(&self.copied).push(text.to_owned());
        }
        self.supported
    }
}

/// Address bar with a push-state history.
#[derive(Debug)]
pub struct MemoryAddressBar {
    href: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryAddressBar {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: Mutex::new(href.into()), history: Mutex::new(Vec::new()) }
    }

    /// Every address pushed so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        lock(&self.history).clone()
    }
}

impl AddressBar for MemoryAddressBar {
    fn href(&self) -> String {
        lock(&self.href).clone()
    }

    fn push_state(&self, url: &str) {
        *lock(&self.href) = url.to_owned();
        lock(&self.history).push(url.to_owned());
    }
}
