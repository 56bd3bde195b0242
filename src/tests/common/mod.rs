// tests/common/mod.rs
#![cfg(test)]

pub use serde_json::json;

use std::sync::Arc;

use httpmock::Method::GET;
use httpmock::{Mock, MockServer};
use reqwest::Client;

use crate::client::link_cache::LinkCache;
use crate::client::short_link::ShortLinkClient;
use crate::config::share::ShareConfigOverrides;
use crate::host::memory::{MemoryClipboard, MemoryWindowOpener};
use crate::widget::popup::PopupRegistry;
use crate::widget::share::ShareServices;

pub const PAGE: &str = "https://site.test/a";

/// Isolated services: private cache and popup registry, in-memory host.
pub struct Harness {
    pub services: ShareServices,
    pub opener: Arc<MemoryWindowOpener>,
    pub clipboard: Arc<MemoryClipboard>,
}

pub fn harness() -> Harness {
    harness_with_clipboard(MemoryClipboard::new())
}

pub fn harness_with_clipboard(clipboard: MemoryClipboard) -> Harness {
    let cache = LinkCache::new();
    let client = ShortLinkClient::with_cache(Client::new(), cache, PAGE);
    let opener = Arc::new(MemoryWindowOpener::new());
    let clipboard = Arc::new(clipboard);
    let services = ShareServices::new(client, opener.clone(), clipboard.clone())
        .with_popup_registry(PopupRegistry::new());
    Harness { services, opener, clipboard }
}

pub fn overrides_for(server: &MockServer) -> ShareConfigOverrides {
    ShareConfigOverrides {
        service_url: Some(server.base_url()),
        ..Default::default()
    }
}

/// `/generate` for one (amount, context) pair.
pub fn mock_generate<'a>(server: &'a MockServer, amount: u32, context: u8, short_url: &str, code: &str) -> Mock<'a> {
    let body = json!({"success": true, "data": {"shortUrl": short_url, "shareCode": code}});
    server.mock(|when, then| {
        when.method(GET)
            .path("/generate")
            .query_param("maxShares", amount.to_string())
            .query_param("context", context.to_string());
        then.status(200).json_body(body);
    })
}

pub fn mock_balance(server: &MockServer, body: serde_json::Value) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/remainingamount");
        then.status(200).json_body(body);
    })
}

/// `/generate` for any amount and context.
pub fn mock_any_generate<'a>(server: &'a MockServer, short_url: &str) -> Mock<'a> {
    let body = json!({"success": true, "data": {"shortUrl": short_url, "shareCode": "ANY"}});
    server.mock(|when, then| {
        when.method(GET).path("/generate");
        then.status(200).json_body(body);
    })
}

/// `/generate` for channel links of any amount.
pub fn mock_social<'a>(server: &'a MockServer, short_url: &str) -> Mock<'a> {
    let body = json!({"success": true, "data": {"shortUrl": short_url, "shareCode": "SOC"}});
    server.mock(|when, then| {
        when.method(GET).path("/generate").query_param("context", "3");
        then.status(200).json_body(body);
    })
}
