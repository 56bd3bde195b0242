use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::catalog::templates::Channel;
use crate::utils::constants::{COMPONENT_NAME, INITIALIZED_ATTR};

/// Attribute that tags an element as a share component.
pub const COMPONENT_ATTR: &str = "data-o-component";

pub type SharedElement = Arc<RwLock<ShareElement>>;

/// Root of one widget's markup: attributes plus the content the widget renders into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareElement {
    pub attributes: BTreeMap<String, String>,
    pub content: ShareContent,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShareContent {
    /// action anchors present in the markup, by channel
    pub anchors: BTreeMap<Channel, Anchor>,
    pub url_box: UrlBox,
    pub gift_options: Vec<GiftOption>,
    pub custom_input: CustomInput,
    /// gift description blocks keyed by gift option value, with visibility
    pub gift_descriptions: BTreeMap<String, bool>,
    /// text of the credit count element, `None` when the markup has none
    pub credit_count: Option<String>,
    pub credit_message_visible: bool,
    /// feedback tooltip bound to the URL box
    pub tooltip: Option<Tooltip>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlBox {
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftOption {
    pub value: String,
    pub checked: bool,
    /// the option that enables the free-form amount input
    pub custom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomInput {
    pub value: String,
    pub disabled: bool,
    pub focused: bool,
}

impl Default for CustomInput {
    fn default() -> Self {
        Self { value: String::new(), disabled: true, focused: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub text: String,
}

impl ShareElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// The markup a share component usually ships with: three social anchors,
    /// presets 1 (checked), 3 and 10, a custom option, descriptions for every
    /// non-default option and a credit count.
    pub fn standard() -> Self {
        Self::new()
            .with_attribute(COMPONENT_ATTR, COMPONENT_NAME)
            .with_anchor(Channel::Twitter)
            .with_anchor(Channel::Facebook)
            .with_anchor(Channel::Linkedin)
            .with_gift_option("1", true)
            .with_gift_option("3", false)
            .with_gift_option("10", false)
            .with_custom_option("cfg")
            .with_description("3")
            .with_description("10")
            .with_description("cfg")
            .with_credit_count()
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn with_anchor(mut self, channel: Channel) -> Self {
        self.content.anchors.insert(channel, Anchor::default());
        self
    }

    pub fn with_gift_option(mut self, value: &str, checked: bool) -> Self {
        self.content.gift_options.push(GiftOption { value: value.to_owned(), checked, custom: false });
        self
    }

    pub fn with_custom_option(mut self, value: &str) -> Self {
        self.content.gift_options.push(GiftOption { value: value.to_owned(), checked: false, custom: true });
        self
    }

    pub fn with_description(mut self, option_value: &str) -> Self {
        self.content.gift_descriptions.insert(option_value.to_owned(), false);
        self
    }

    pub fn with_credit_count(mut self) -> Self {
        self.content.credit_count = Some(String::new());
        self
    }

    pub fn into_shared(self) -> SharedElement {
        Arc::new(RwLock::new(self))
    }

    pub fn is_share_component(&self) -> bool {
        self.attributes.get(COMPONENT_ATTR).map(String::as_str) == Some(COMPONENT_NAME)
    }

    pub fn is_initialized(&self) -> bool {
        self.attributes.contains_key(INITIALIZED_ATTR)
    }

    pub fn mark_initialized(&mut self) {
        self.attributes.insert(INITIALIZED_ATTR.to_owned(), String::new());
    }

    pub fn clear_initialized(&mut self) {
        self.attributes.remove(INITIALIZED_ATTR);
    }
}

impl ShareContent {
    pub fn checked_option(&self) -> Option<&GiftOption> {
        self.gift_options.iter().find(|option| option.checked)
    }

    pub fn option(&self, value: &str) -> Option<&GiftOption> {
        self.gift_options.iter().find(|option| option.value == value)
    }

    /// Check the option with `value` and uncheck the rest, radio-style.
    /// Returns the newly checked option, or `None` when no option has that value.
    pub fn check_option(&mut self, value: &str) -> Option<GiftOption> {
        self.option(value)?;
        for option in self.gift_options.iter_mut() {
            option.checked = option.value == value;
        }
        self.checked_option().cloned()
    }

    pub fn has_anchor(&self, channel: Channel) -> bool {
        self.anchors.contains_key(&channel)
    }

    pub fn anchor_href(&self, channel: Channel) -> Option<&str> {
        self.anchors
            .get(&channel)
            .and_then(|anchor| anchor.href.as_deref())
            .filter(|href| !href.is_empty())
    }

    /// Show at most the description for `option_value`; hide every other one.
    /// Returns whether a matching description exists.
    pub fn show_description(&mut self, option_value: Option<&str>) -> bool {
        let mut shown = false;
        for (value, visible) in self.gift_descriptions.iter_mut() {
            *visible = Some(value.as_str()) == option_value;
            shown |= *visible;
        }
        shown
    }
}

/// A page: its address plus every element that may host a share component.
#[derive(Debug, Clone, Default)]
pub struct ShareDocument {
    pub location: String,
    pub elements: Vec<SharedElement>,
}

impl ShareDocument {
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: location.into(), elements: Vec::new() }
    }

    pub fn with_element(mut self, element: SharedElement) -> Self {
        self.elements.push(element);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checking_an_option_is_exclusive() {
        let mut element = ShareElement::standard();
        let checked = element.content.check_option("cfg").unwrap();

        assert!(checked.custom);
        let checked_values: Vec<_> = element
            .content
            .gift_options
            .iter()
            .filter(|o| o.checked)
            .map(|o| o.value.as_str())
            .collect();
        assert_eq!(checked_values, vec!["cfg"]);
        assert!(element.content.check_option("missing").is_none());
    }

    #[test]
    fn at_most_one_description_is_visible() {
        let mut content = ShareElement::standard().content;

        assert!(content.show_description(Some("3")));
        assert!(content.gift_descriptions["3"]);
        assert!(!content.gift_descriptions["10"]);

        assert!(!content.show_description(Some("1")));
        assert!(content.gift_descriptions.values().all(|visible| !visible));
    }

    #[test]
    fn initialized_marker_round_trips() {
        let mut element = ShareElement::standard();
        assert!(element.is_share_component());
        assert!(!element.is_initialized());
        element.mark_initialized();
        assert!(element.is_initialized());
        element.clear_initialized();
        assert!(!element.is_initialized());
    }
}
