//! Host seams: everything the widget needs from the page it is embedded in.
//!
//! The widget never touches a rendering substrate directly. It mutates a
//! [`markup::ShareElement`] view-model and talks to the browser through the
//! traits below; [`memory`] provides in-process implementations.

pub mod markup;
pub mod memory;

use std::sync::Arc;

/// Size of a popup window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFeatures {
    pub width: u32,
    pub height: u32,
}

impl WindowFeatures {
    /// `width=..,height=..` feature string understood by browsers.
    pub fn as_feature_string(&self) -> String {
        format!("width={},height={}", self.width, self.height)
    }
}

/// Handle to a window the host opened.
pub trait PopupWindow: Send + Sync {
    fn is_closed(&self) -> bool;
    fn focus(&self);
}

/// Opens browser windows. `None` means the host refused (e.g. popup blocked).
pub trait WindowOpener: Send + Sync {
    fn open(&self, url: &str, name: &str, features: Option<WindowFeatures>) -> Option<Arc<dyn PopupWindow>>;
}

/// Platform copy action on the currently selected text.
pub trait Clipboard: Send + Sync {
    /// Returns false when copying failed or is unsupported.
    fn copy(&self, text: &str) -> bool;
}

/// The page's visible address.
pub trait AddressBar: Send + Sync {
    fn href(&self) -> String;
    /// Replace the visible address without reloading the page.
    fn push_state(&self, url: &str);
}
