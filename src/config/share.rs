use serde::Deserialize;
use std::collections::BTreeMap;

use crate::utils::constants::{
    DEFAULT_SERVICE_URL, LINKS_ATTR, RELATED_TWITTER_ACCOUNTS_ATTR, SUMMARY_ATTR, TITLE_ATTR,
    TITLE_EXTRA_ATTR, URL_ATTR,
};
use crate::widget::amount::ShareAmount;

/// ================================
/// Per-widget share configuration
/// ================================
///
/// Built once per widget from, in increasing precedence: built-in defaults,
/// `data-labs-o-share-*` markup attributes, caller overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareConfig {
    /// channel names in declaration order
    pub links: Vec<String>,
    pub url: String,
    pub title: String,
    pub title_extra: String,
    pub summary: String,
    pub related_twitter_accounts: String,
    pub service_url: String,
    pub default_share_amount: ShareAmount,
    /// canonical content address sent to the issuing service
    pub target: String,
}

/// Caller-supplied overrides; every field is optional.
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ShareConfigOverrides {
    pub links: Option<Vec<String>>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub title_extra: Option<String>,
    pub summary: Option<String>,
    pub related_twitter_accounts: Option<String>,
    pub service_url: Option<String>,
    pub default_share_amount: Option<u32>,
    pub target: Option<String>,
}

impl ShareConfig {
    /// Built-in defaults for a page served from `page_address`.
    pub fn defaults(page_address: &str) -> Self {
        Self {
            links: Vec::new(),
            url: String::new(),
            title: String::new(),
            title_extra: String::new(),
            summary: String::new(),
            related_twitter_accounts: String::new(),
            service_url: DEFAULT_SERVICE_URL.to_owned(),
            default_share_amount: ShareAmount::ONE,
            target: canonical_address(page_address),
        }
    }

    pub fn build(
        page_address: &str,
        attributes: &BTreeMap<String, String>,
        overrides: &ShareConfigOverrides,
    ) -> Self {
        let mut config = Self::defaults(page_address);
        config.apply_attributes(attributes);
        config.apply_overrides(overrides);
        config
    }

    fn apply_attributes(&mut self, attributes: &BTreeMap<String, String>) {
        if let Some(links) = attributes.get(LINKS_ATTR) {
            self.links = links.split(' ').filter(|l| !l.is_empty()).map(str::to_owned).collect();
        }
        // empty attribute values fall back to the default, as an absent attribute does
        let text = |name: &str| attributes.get(name).filter(|v| !v.is_empty()).cloned();
        if let Some(url) = text(URL_ATTR) {
            self.url = url;
        }
        if let Some(title) = text(TITLE_ATTR) {
            self.title = title;
        }
        if let Some(title_extra) = text(TITLE_EXTRA_ATTR) {
            self.title_extra = title_extra;
        }
        if let Some(summary) = text(SUMMARY_ATTR) {
            self.summary = summary;
        }
        if let Some(accounts) = text(RELATED_TWITTER_ACCOUNTS_ATTR) {
            self.related_twitter_accounts = accounts;
        }
    }

    fn apply_overrides(&mut self, overrides: &ShareConfigOverrides) {
        let o = overrides.clone();
        if let Some(links) = o.links {
            self.links = links;
        }
        if let Some(url) = o.url {
            self.url = url;
        }
        if let Some(title) = o.title {
            self.title = title;
        }
        if let Some(title_extra) = o.title_extra {
            self.title_extra = title_extra;
        }
        if let Some(summary) = o.summary {
            self.summary = summary;
        }
        if let Some(accounts) = o.related_twitter_accounts {
            self.related_twitter_accounts = accounts;
        }
        if let Some(service_url) = o.service_url {
            self.service_url = service_url.trim_end_matches('/').to_owned();
        }
        if let Some(amount) = o.default_share_amount.and_then(ShareAmount::new) {
            self.default_share_amount = amount;
        }
        if let Some(target) = o.target {
            self.target = target;
        }
    }
}

/// Page address with its query string stripped.
pub fn canonical_address(page_address: &str) -> String {
    page_address
        .split('?')
        .next()
        .unwrap_or_default()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_use_page_address_without_query() {
        let config = ShareConfig::defaults("https://site.test/a?x=1&share_code=OLD");
        assert_eq!(config.target, "https://site.test/a");
        assert_eq!(config.service_url, "https://sharecode.ft.com");
        assert_eq!(config.default_share_amount.get(), 1);
        assert!(config.links.is_empty());
    }

    #[test]
    fn overrides_win_over_attributes() {
        let attributes = attrs(&[
            (LINKS_ATTR, "twitter facebook  email"),
            (TITLE_ATTR, "From markup"),
            (SUMMARY_ATTR, "Markup summary"),
        ]);
        let overrides = ShareConfigOverrides {
            title: Some("From caller".to_owned()),
            service_url: Some("https://svc.test/".to_owned()),
            ..Default::default()
        };

        let config = ShareConfig::build("https://site.test/a", &attributes, &overrides);

        assert_eq!(config.links, vec!["twitter", "facebook", "email"]);
        assert_eq!(config.title, "From caller");
        assert_eq!(config.summary, "Markup summary");
        assert_eq!(config.service_url, "https://svc.test");
    }

    #[test]
    fn zero_default_amount_is_ignored() {
        let overrides = ShareConfigOverrides {
            default_share_amount: Some(0),
            ..Default::default()
        };
        let config = ShareConfig::build("https://site.test/a", &BTreeMap::new(), &overrides);
        assert_eq!(config.default_share_amount.get(), 1);
    }
}
