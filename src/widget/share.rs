//! Widget controller: configuration, lifecycle and event wiring.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::Receiver;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::catalog::templates::Channel;
use crate::client::short_link::{ShareContext, ShortLinkClient};
use crate::config::share::{ShareConfig, ShareConfigOverrides};
use crate::host::markup::{ShareContent, ShareDocument, SharedElement};
use crate::host::{Clipboard, WindowFeatures, WindowOpener};
use crate::utils::constants::{DEFAULT_POPUP_HEIGHT, DEFAULT_POPUP_WIDTH};
use crate::widget::events::{EventBus, ShareAction, ShareEvent, ShareEventKind, ShareId, UiEvent};
use crate::widget::feedback::FeedbackController;
use crate::widget::gift::GiftSelection;
use crate::widget::popup::{PopupManager, PopupOutcome, PopupRegistry};
use crate::widget::task::WidgetTasks;

/// Collaborators shared by the widgets of one page.
#[derive(Clone)]
pub struct ShareServices {
    pub client: ShortLinkClient,
    pub popups: PopupRegistry,
    pub opener: Arc<dyn WindowOpener>,
    pub clipboard: Arc<dyn Clipboard>,
    pub events: EventBus,
    pub popup_features: WindowFeatures,
}

impl ShareServices {
    /// Services using the process-wide popup registry and a fresh event bus.
    pub fn new(client: ShortLinkClient, opener: Arc<dyn WindowOpener>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self {
            client,
            popups: PopupRegistry::global(),
            opener,
            clipboard,
            events: EventBus::new(),
            popup_features: WindowFeatures { width: DEFAULT_POPUP_WIDTH, height: DEFAULT_POPUP_HEIGHT },
        }
    }

    pub fn with_popup_registry(mut self, popups: PopupRegistry) -> Self {
        self.popups = popups;
        self
    }

    pub fn with_popup_features(mut self, features: WindowFeatures) -> Self {
        self.popup_features = features;
        self
    }
}

pub(crate) struct ShareInner {
    pub(crate) id: ShareId,
    pub(crate) config: ShareConfig,
    pub(crate) element: SharedElement,
    pub(crate) client: ShortLinkClient,
    pub(crate) popups: PopupManager,
    pub(crate) opener: Arc<dyn WindowOpener>,
    pub(crate) clipboard: Arc<dyn Clipboard>,
    pub(crate) events: EventBus,
    pub(crate) feedback: Mutex<FeedbackController>,
    /// `None` until the ready signal established the initial amount
    pub(crate) selection: RwLock<Option<GiftSelection>>,
    pub(crate) tasks: WidgetTasks,
}

impl ShareInner {
    /// Apply `f` to the widget's content unless the widget was destroyed.
    pub(crate) async fn mutate<R>(&self, f: impl FnOnce(&mut ShareContent) -> R) -> Option<R> {
        if !self.tasks.is_live() {
            debug!("share {:?} destroyed, dropping update", self.id);
            return None;
        }
        let mut element = self.element.write().await;
        // destroy may have run while waiting for the lock
        if !self.tasks.is_live() {
            return None;
        }
        Some(f(&mut element.content))
    }

    pub(crate) fn emit(&self, kind: ShareEventKind) {
        self.events.emit(ShareEvent { share: self.id, kind });
    }

    pub(crate) fn feedback(&self) -> MutexGuard<'_, FeedbackController> {
        self.feedback.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn social_clicked(&self, channel: Channel) {
        let href = self.element.read().await.content.anchor_href(channel).map(str::to_owned);
        let Some(url) = href else {
            debug!("no destination rendered for {} yet", channel);
            return;
        };
        if self.popups.open(&url) != PopupOutcome::Ignored {
            self.emit(ShareEventKind::Open { action: ShareAction::Social, url });
        }
    }

    fn email_clicked(self: &Arc<Self>) {
        let this = self.clone();
        self.tasks.spawn(async move {
            let amount = this.current_amount().await;
            match this.social_url(Channel::Email, amount, ShareContext::Social).await {
                Ok(Some(url)) if this.tasks.is_live() => {
                    this.opener.open(&url, "mailto", None);
                }
                Ok(_) => {}
                Err(e) => warn!("email link failed: {:#}", e),
            }
        });
    }

    async fn copy_clicked(&self) {
        let clipboard = self.clipboard.clone();
        let copied = self
            .mutate(|content| self.feedback().copy_url(content, clipboard.as_ref()))
            .await
            .flatten();
        if copied.is_some() {
            self.url_copied().await;
        }
    }

    async fn url_copied(&self) {
        if let Some(url) = self.mutate(|content| self.feedback().copied(content)).await {
            self.emit(ShareEventKind::Copy { action: ShareAction::Url, url });
        }
    }

    async fn document_event(&self, inside_link: bool) {
        self.mutate(|content| self.feedback().on_document_event(content, inside_link)).await;
    }
}

/// One share widget bound to one share element.
#[derive(Clone)]
pub struct Share {
    inner: Arc<ShareInner>,
}

impl Share {
    /// Build the configuration, mark the element initialized, announce `ready`
    /// and render the initial link.
    pub async fn init(
        element: SharedElement,
        page_address: &str,
        services: &ShareServices,
        overrides: &ShareConfigOverrides,
    ) -> Self {
        let config = {
            let mut root = element.write().await;
            root.mark_initialized();
            ShareConfig::build(page_address, &root.attributes, overrides)
        };

        let inner = Arc::new(ShareInner {
            id: ShareId::next(),
            config,
            element,
            client: services.client.clone(),
            popups: PopupManager::new(services.popups.clone(), services.opener.clone(), services.popup_features),
            opener: services.opener.clone(),
            clipboard: services.clipboard.clone(),
            events: services.events.clone(),
            feedback: Mutex::new(FeedbackController::new()),
            selection: RwLock::new(None),
            tasks: WidgetTasks::new(),
        });
        info!("share {:?} initialized for {}", inner.id, inner.config.target);

        inner.emit(ShareEventKind::Ready);
        inner.on_ready().await;
        Self { inner }
    }

    /// Initialize every share component of `document` not initialized yet.
    pub async fn init_all(
        document: &ShareDocument,
        services: &ShareServices,
        overrides: &ShareConfigOverrides,
    ) -> Vec<Share> {
        let mut shares = Vec::new();
        for element in &document.elements {
            let eligible = {
                let root = element.read().await;
                root.is_share_component() && !root.is_initialized()
            };
            if eligible {
                shares.push(Share::init(element.clone(), &document.location, services, overrides).await);
            }
        }
        info!("initialized {} share components", shares.len());
        shares
    }

    pub fn id(&self) -> ShareId {
        self.inner.id
    }

    pub fn config(&self) -> &ShareConfig {
        &self.inner.config
    }

    pub fn element(&self) -> SharedElement {
        self.inner.element.clone()
    }

    pub fn subscribe(&self) -> Receiver<ShareEvent> {
        self.inner.events.subscribe()
    }

    pub async fn selection(&self) -> Option<GiftSelection> {
        *self.inner.selection.read().await
    }

    /// Active tooltip dismiss listener pairs (0 or 1).
    pub fn dismiss_listener_pairs(&self) -> usize {
        self.inner.feedback().listener_pairs()
    }

    pub fn is_live(&self) -> bool {
        self.inner.tasks.is_live()
    }

    /// Dispatch one user interaction. Ignored once the widget is destroyed.
    pub async fn handle(&self, event: UiEvent) {
        if !self.is_live() {
            debug!("share {:?} destroyed, ignoring {:?}", self.inner.id, event);
            return;
        }
        match event {
            UiEvent::GiftOptionChanged { value } => self.inner.gift_option_changed(&value).await,
            UiEvent::CustomAmountChanged { value } => self.inner.custom_amount_changed(&value).await,
            UiEvent::CopyClicked => self.inner.copy_clicked().await,
            UiEvent::UrlCopied => self.inner.url_copied().await,
            UiEvent::SocialClicked { channel } => self.inner.social_clicked(channel).await,
            UiEvent::EmailClicked => self.inner.email_clicked(),
            UiEvent::DocumentClicked { inside_link } | UiEvent::DocumentKeyPressed { inside_link } => {
                self.inner.document_event(inside_link).await
            }
        }
    }

    /// Wait for every pending resolution and write-back of this widget.
    pub async fn settled(&self) {
        self.inner.tasks.settled().await;
    }

    /// Detach the widget: pending continuations are cancelled, the tooltip and
    /// the rendered content are removed, and the initialized marker is cleared.
    pub async fn destroy(&self) {
        self.inner.tasks.cancel();
        let mut root = self.inner.element.write().await;
        self.inner.feedback().destroy(&mut root.content);
        // take the whole content at once instead of removing children while iterating them
        let removed = std::mem::take(&mut root.content);
        debug!(
            "share {:?} removed {} anchors, {} gift options",
            self.inner.id,
            removed.anchors.len(),
            removed.gift_options.len()
        );
        root.clear_initialized();
        info!("share {:?} destroyed", self.inner.id);
    }
}
