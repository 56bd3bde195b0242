use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::short_link::{ShareContext, ShortLinkClient};
use crate::host::AddressBar;
use crate::utils::constants::{DEFAULT_SERVICE_URL, SHARE_CODE_PARAM};
use crate::widget::amount::ShareAmount;

/// Attaches a freshly claimed share code to the page's own address.
///
/// One instance per page. The claim timer is armed at most once for the
/// lifetime of the instance; later invocations only strip a stale code.
pub struct ShareCodeInjector {
    client: ShortLinkClient,
    address: Arc<dyn AddressBar>,
    delay: Duration,
    scheduled: AtomicBool,
}

impl ShareCodeInjector {
    pub fn new(client: ShortLinkClient, address: Arc<dyn AddressBar>, delay: Duration) -> Self {
        Self { client, address, delay, scheduled: AtomicBool::new(false) }
    }

    /// Strip any share code already in the address, then arm the claim timer
    /// unless it was armed before. Returns the timer task when this call armed it.
    pub fn inject(&self, service_url: Option<&str>, share_amount: Option<ShareAmount>) -> Option<JoinHandle<()>> {
        let href = self.address.href();
        if let Some(stripped) = strip_share_code(&href) {
            info!("removing existing share code from {}", href);
            self.address.push_state(&stripped);
        }

        if self.scheduled.swap(true, Ordering::SeqCst) {
            debug!("share code claim already scheduled");
            return None;
        }

        let client = self.client.clone();
        let address = self.address.clone();
        let delay = self.delay;
        let service_url = service_url.unwrap_or(DEFAULT_SERVICE_URL).to_owned();
        let amount = share_amount.unwrap_or(ShareAmount::ONE);

        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match client.resolve(&service_url, amount.get(), ShareContext::PageLoad, None).await {
                Ok(link) if link.success => {
                    let current = address.href();
                    let with_code = append_share_code(&current, &link.share_code);
                    info!("attaching share code to {}", current);
                    address.push_state(&with_code);
                }
                Ok(_) => warn!("share code claim unsuccessful, address left unchanged"),
                Err(e) => warn!("share code claim failed: {:#}", e),
            }
        }))
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled.load(Ordering::SeqCst)
    }
}

/// Address without its `share_code` parameter. The other parameters are kept
/// byte for byte and in order. `None` when there is nothing to strip or the
/// address does not parse.
pub fn strip_share_code(href: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    let query = url.query()?;

    let parts: Vec<&str> = query.split('&').collect();
    let remaining: Vec<&str> = parts
        .iter()
        .copied()
        .filter(|part| part.split('=').next() != Some(SHARE_CODE_PARAM))
        .collect();
    if remaining.len() == parts.len() {
        return None;
    }

    let remaining = remaining.join("&");
    if remaining.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&remaining));
    }
    Some(url.to_string())
}

pub fn append_share_code(href: &str, code: &str) -> String {
    let join = if href.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", href, join, SHARE_CODE_PARAM, urlencoding::encode(code))
}
