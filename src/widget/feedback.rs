use tracing::debug;

use crate::host::markup::{ShareContent, Tooltip};
use crate::host::Clipboard;
use crate::utils::constants::{COPIED_MESSAGE, COPY_INSTRUCTION_MESSAGE};

/// Transient tooltip feedback for one widget.
///
/// At most one tooltip and at most one pair of page-level dismiss listeners
/// (click + key press) exist at a time. The tooltip lives in the widget's
/// content so hosts render it; this controller owns the listener state.
#[derive(Debug, Default)]
pub struct FeedbackController {
    listening: bool,
}

impl FeedbackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or reuse the tooltip, set its text, and listen for dismissal.
    pub fn show(&mut self, content: &mut ShareContent, message: &str) {
        match content.tooltip.as_mut() {
            Some(tooltip) => tooltip.text = message.to_owned(),
            None => content.tooltip = Some(Tooltip { text: message.to_owned() }),
        }
        if !self.listening {
            debug!("registering tooltip dismiss listeners");
            self.listening = true;
        }
    }

    /// A click or key press somewhere on the page. Anything outside the share
    /// link area dismisses the tooltip and removes both listeners.
    /// Returns whether the tooltip was dismissed.
    pub fn on_document_event(&mut self, content: &mut ShareContent, inside_link: bool) -> bool {
        if !self.listening || inside_link {
            return false;
        }
        self.destroy(content);
        true
    }

    pub fn destroy(&mut self, content: &mut ShareContent) {
        content.tooltip = None;
        if self.listening {
            debug!("removing tooltip dismiss listeners");
            self.listening = false;
        }
    }

    /// Active click + key press listener pairs, 0 or 1.
    pub fn listener_pairs(&self) -> usize {
        usize::from(self.listening)
    }

    /// Select the URL box and run the platform copy action. Returns the copied
    /// URL on success; on failure shows the instructional message instead.
    pub fn copy_url(&mut self, content: &mut ShareContent, clipboard: &dyn Clipboard) -> Option<String> {
        content.url_box.selected = true;
        let url = content.url_box.value.clone();
        if clipboard.copy(&url) {
            Some(url)
        } else {
            self.show(content, COPY_INSTRUCTION_MESSAGE);
            None
        }
    }

    /// Confirm a completed copy. Returns the copied URL.
    pub fn copied(&mut self, content: &mut ShareContent) -> String {
        self.show(content, COPIED_MESSAGE);
        content.url_box.value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::markup::ShareElement;
    use crate::host::memory::MemoryClipboard;

    #[test]
    fn repeated_show_updates_text_with_a_single_listener_pair() {
        let mut content = ShareElement::standard().content;
        let mut feedback = FeedbackController::new();

        feedback.show(&mut content, "first");
        feedback.show(&mut content, "second");

        assert_eq!(content.tooltip.as_ref().map(|t| t.text.as_str()), Some("second"));
        assert_eq!(feedback.listener_pairs(), 1);
    }

    #[test]
    fn outside_event_dismisses_once() {
        let mut content = ShareElement::standard().content;
        let mut feedback = FeedbackController::new();
        feedback.show(&mut content, "hello");

        assert!(!feedback.on_document_event(&mut content, true));
        assert!(content.tooltip.is_some());

        assert!(feedback.on_document_event(&mut content, false));
        assert!(content.tooltip.is_none());
        assert_eq!(feedback.listener_pairs(), 0);

        // listeners are gone, later events are ignored
        assert!(!feedback.on_document_event(&mut content, false));
    }

    #[test]
    fn failed_copy_shows_instruction() {
        let mut content = ShareElement::standard().content;
        content.url_box.value = "https://svc.test/s/abc".to_owned();
        let mut feedback = FeedbackController::new();

        assert_eq!(feedback.copy_url(&mut content, &MemoryClipboard::unsupported()), None);
        assert!(content.url_box.selected);
        assert_eq!(content.tooltip.unwrap().text, "Copy link to clipboard");
    }

    #[test]
    fn successful_copy_then_confirmation() {
        let mut content = ShareElement::standard().content;
        content.url_box.value = "https://svc.test/s/abc".to_owned();
        let mut feedback = FeedbackController::new();
        let clipboard = MemoryClipboard::new();

        let copied = feedback.copy_url(&mut content, &clipboard);
        assert_eq!(copied.as_deref(), Some("https://svc.test/s/abc"));
        assert!(content.tooltip.is_none());

        assert_eq!(feedback.copied(&mut content), "https://svc.test/s/abc");
        assert_eq!(content.tooltip.unwrap().text, "Link copied to clipboard");
        assert_eq!(clipboard.copied(), vec!["https://svc.test/s/abc"]);
    }
}
