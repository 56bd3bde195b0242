use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use share_widget::client::short_link::ShortLinkClient;
use share_widget::config::settings::WidgetSettings;
use share_widget::config::share::canonical_address;
use share_widget::host::markup::ShareElement;
use share_widget::host::memory::{MemoryAddressBar, MemoryClipboard, MemoryWindowOpener};
use share_widget::host::{AddressBar, WindowFeatures};
use share_widget::observability::metrics::get_metrics;
use share_widget::utils::config_loader;
use share_widget::utils::logging;
use share_widget::utils::logging::LogLevel;
use share_widget::widget::events::UiEvent;
use share_widget::widget::injector::ShareCodeInjector;
use share_widget::widget::share::{Share, ShareServices};
use tracing::info;

/// value of the custom gift option in the standard markup
const CUSTOM_OPTION: &str = "cfg";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "SHARE_WIDGET_CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// address of the page hosting the widget
    #[arg(long)]
    page: String,
    /// gift amount to select once the widget is ready
    #[arg(long)]
    amount: Option<u32>,
    /// free-form custom amount text, selects the custom option
    #[arg(long, conflicts_with = "amount")]
    custom: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load settings, init logging
    // -------------------------------

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => config_loader::run(path).await?,
        None => WidgetSettings::default(),
    };
    logging::run(&settings, args.log_level.to_owned())?;

    // -------------------------------
    // 2. Host and shared services
    // -------------------------------

    let client = ShortLinkClient::new(canonical_address(&args.page))?;
    let address = Arc::new(MemoryAddressBar::new(args.page.clone()));
    let services = ShareServices::new(
        client.clone(),
        Arc::new(MemoryWindowOpener::new()),
        Arc::new(MemoryClipboard::new()),
    )
    .with_popup_features(WindowFeatures { width: settings.popup.width, height: settings.popup.height });

    let mut events = services.events.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("share event '{}': {:?}", event.name(), event.kind);
        }
    });

    // -------------------------------
    // 3. Widget
    // -------------------------------

    let element = ShareElement::standard().into_shared();
    let share = Share::init(element.clone(), &args.page, &services, &settings.share).await;

    if let Some(amount) = args.amount {
        let preset = element.read().await.content.option(&amount.to_string()).is_some();
        if preset {
            share.handle(UiEvent::GiftOptionChanged { value: amount.to_string() }).await;
        } else {
            select_custom(&share, amount.to_string()).await;
        }
    } else if let Some(custom) = args.custom {
        select_custom(&share, custom).await;
    }
    share.settled().await;

    {
        let root = element.read().await;
        println!("url: {}", root.content.url_box.value);
        for (channel, anchor) in &root.content.anchors {
            println!("{}: {}", channel, anchor.href.as_deref().unwrap_or("-"));
        }
        if let Some(count) = root.content.credit_count.as_deref().filter(|count| !count.is_empty()) {
            println!("credits: {}", count);
        }
    }

    // -------------------------------
    // 4. Share code for the page itself
    // -------------------------------

    let injector = ShareCodeInjector::new(client, address.clone(), Duration::from_millis(settings.claim_delay_ms));
    let config = share.config();
    if let Some(timer) = injector.inject(Some(&config.service_url), Some(config.default_share_amount)) {
        timer.await?;
    }
    println!("page: {}", address.href());

    share.destroy().await;

    if settings.metrics.is_enabled {
        print!("{}", get_metrics().encode()?);
    }
    Ok(())
}

async fn select_custom(share: &Share, value: String) {
    share.handle(UiEvent::GiftOptionChanged { value: CUSTOM_OPTION.to_owned() }).await;
    share.handle(UiEvent::CustomAmountChanged { value }).await;
}
