//! Social link renderer: fills every channel anchor and the copy box.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::catalog::templates::{render_channel, Channel};
use crate::client::short_link::ShareContext;
use crate::widget::amount::ShareAmount;
use crate::widget::share::ShareInner;

impl ShareInner {
    /// Destination for `channel`, or `None` when the issuing service declined.
    pub(crate) async fn social_url(
        &self,
        channel: Channel,
        amount: ShareAmount,
        context: ShareContext,
    ) -> Result<Option<String>> {
        let link = self
            .client
            .resolve(&self.config.service_url, amount.get(), context, Some(&self.config.target))
            .await?;
        Ok(link
            .success
            .then(|| render_channel(channel, &link.short_url, &self.config)))
    }

    /// Re-render channel anchors present in the markup, the copy box and the
    /// gift description for the checked option. Channels without an anchor
    /// cost no request; declined or failed resolutions keep the old value.
    pub(crate) async fn render(self: &Arc<Self>, amount: ShareAmount) {
        let (channels, checked) = {
            let root = self.element.read().await;
            let channels: Vec<Channel> = Channel::ALL
                .into_iter()
                .filter(|channel| root.content.has_anchor(*channel))
                .collect();
            let checked = root.content.checked_option().map(|option| option.value.clone());
            (channels, checked)
        };
        debug!("share {:?} rendering {} channels for amount {}", self.id, channels.len(), amount);

        for channel in channels {
            let this = self.clone();
            self.tasks.spawn(async move {
                match this.social_url(channel, amount, ShareContext::Social).await {
                    Ok(Some(url)) => {
                        this.mutate(|content| {
                            if let Some(anchor) = content.anchors.get_mut(&channel) {
                                anchor.href = Some(url);
                            }
                        })
                        .await;
                    }
                    Ok(None) => debug!("{} link declined, keeping previous", channel),
                    Err(e) => warn!("{} link failed: {:#}", channel, e),
                }
            });
        }

        // the copy box reuses the copy-box context so it shares the cached link
        let this = self.clone();
        self.tasks.spawn(async move {
            match this.social_url(Channel::Url, amount, ShareContext::UrlBox).await {
                Ok(Some(url)) => {
                    this.mutate(|content| content.url_box.value = url).await;
                }
                Ok(None) => debug!("copy-box link declined, keeping previous"),
                Err(e) => warn!("copy-box link failed: {:#}", e),
            }
        });

        self.mutate(|content| {
            let described = content.show_description(checked.as_deref());
            content.credit_message_visible = described;
        })
        .await;
    }
}
