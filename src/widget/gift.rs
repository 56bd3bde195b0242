//! Gift amount coordinator.
//!
//! Owns the selected share amount. Every transition re-resolves the copy-box
//! link, refreshes the credit balance and re-renders the channel links, all
//! as background tasks so the triggering event returns immediately.
//!
//! Overlapping transitions race: a slow resolution for an earlier amount may
//! land after a faster one for a later amount and overwrite it. Requests are
//! never cancelled except by destroying the widget.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::client::short_link::ShareContext;
use crate::widget::amount::ShareAmount;
use crate::widget::share::ShareInner;
use crate::widget::task::after_current_turn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftSelection {
    /// before any interaction: the pre-checked preset or the configured default
    Unselected(ShareAmount),
    Preset(ShareAmount),
    Custom(ShareAmount),
}

impl GiftSelection {
    pub fn amount(&self) -> ShareAmount {
        match *self {
            GiftSelection::Unselected(amount)
            | GiftSelection::Preset(amount)
            | GiftSelection::Custom(amount) => amount,
        }
    }
}

impl ShareInner {
    pub(crate) async fn current_amount(&self) -> ShareAmount {
        self.selection
            .read()
            .await
            .map(|selection| selection.amount())
            .unwrap_or(self.config.default_share_amount)
    }

    /// Establish the initial amount from the pre-checked option and render it.
    pub(crate) async fn on_ready(self: &Arc<Self>) {
        let checked = self
            .element
            .read()
            .await
            .content
            .checked_option()
            .and_then(|option| ShareAmount::parse(&option.value));
        let amount = checked.unwrap_or(self.config.default_share_amount);
        debug!("share {:?} ready with amount {}", self.id, amount);

        *self.selection.write().await = Some(GiftSelection::Unselected(amount));
        self.resolve_url_box(amount);
        self.render(amount).await;
    }

    pub(crate) async fn gift_option_changed(self: &Arc<Self>, value: &str) {
        if self.selection.read().await.is_none() {
            debug!("gift option changed before ready, ignored");
            return;
        }
        let Some(option) = self.mutate(|content| content.check_option(value)).await.flatten() else {
            warn!("unknown gift option '{}'", value);
            return;
        };

        let selection = if option.custom {
            let amount = self
                .mutate(|content| {
                    let input = &mut content.custom_input;
                    input.disabled = false;
                    input.focused = true;
                    coerce_custom_input(&mut input.value)
                })
                .await;
            amount.map(GiftSelection::Custom)
        } else {
            self.mutate(|content| {
                content.custom_input.disabled = true;
                content.custom_input.focused = false;
            })
            .await
            .map(|_| GiftSelection::Preset(ShareAmount::coerce(&option.value)))
        };

        if let Some(selection) = selection {
            self.transition(selection).await;
        }
    }

    pub(crate) async fn custom_amount_changed(self: &Arc<Self>, value: &str) {
        if !matches!(*self.selection.read().await, Some(GiftSelection::Custom(_))) {
            debug!("custom amount edited while custom option inactive, ignored");
            return;
        }
        let amount = self
            .mutate(|content| {
                let input = &mut content.custom_input;
                input.value = value.to_owned();
                coerce_custom_input(&mut input.value)
            })
            .await;
        if let Some(amount) = amount {
            self.transition(GiftSelection::Custom(amount)).await;
        }
    }

    async fn transition(self: &Arc<Self>, selection: GiftSelection) {
        debug!("share {:?} selection -> {:?}", self.id, selection);
        *self.selection.write().await = Some(selection);
        let amount = selection.amount();
        self.resolve_url_box(amount);
        self.refresh_balance();
        self.render(amount).await;
    }

    /// Resolve the copy-box link for `amount` and write it after the current turn.
    fn resolve_url_box(self: &Arc<Self>, amount: ShareAmount) {
        let this = self.clone();
        self.tasks.spawn(async move {
            let resolved = this
                .client
                .resolve(&this.config.service_url, amount.get(), ShareContext::UrlBox, Some(&this.config.target))
                .await;
            match resolved {
                Ok(link) if link.success => {
                    after_current_turn().await;
                    this.mutate(|content| content.url_box.value = link.short_url).await;
                }
                Ok(_) => debug!("copy-box link unsuccessful for amount {}", amount),
                Err(e) => warn!("copy-box link for amount {} failed: {:#}", amount, e),
            }
        });
    }

    /// Refresh the credit count. Failures are logged and leave the count as is.
    fn refresh_balance(self: &Arc<Self>) {
        let this = self.clone();
        self.tasks.spawn(async move {
            match this.client.remaining_tokens(&this.config.service_url).await {
                Ok(balance) => {
                    this.mutate(|content| {
                        if let Some(count) = content.credit_count.as_mut() {
                            *count = balance.to_string();
                        }
                    })
                    .await;
                }
                Err(e) => error!(
                    "There was an error trying to obtain the remaining number of sharing tokens for the subscriber: {:#}",
                    e
                ),
            }
        });
    }
}

/// Replace an unusable custom amount with the fallback and return the amount.
fn coerce_custom_input(value: &mut String) -> ShareAmount {
    match ShareAmount::parse(value) {
        Some(amount) => amount,
        None => {
            let fallback = ShareAmount::fallback();
            *value = fallback.to_string();
            fallback
        }
    }
}
