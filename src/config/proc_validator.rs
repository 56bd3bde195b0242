//! Settings validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates the share block (issuing service URL, amount, channel names, target)
//!   and the popup/claim invariants.

use anyhow::{anyhow, Result};
use tracing::{error, info};
use url::Url;

use crate::catalog::templates::Channel;
use crate::config::settings::WidgetSettings;
use crate::observability::metrics::get_metrics;

/// Public entrypoint: returns Ok(()) or an error listing every issue.
pub fn validate_settings(settings: &WidgetSettings) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_share(settings, &mut errors);

    if settings.popup.width == 0 || settings.popup.height == 0 {
        errors.push(format!(
            "popup size {}x{} must be positive",
            settings.popup.width, settings.popup.height
        ));
    }
    if settings.claim_delay_ms > 60 * 60 * 1000 {
        errors.push(format!(
            "claim_delay_ms ({}) is unreasonably large",
            settings.claim_delay_ms
        ));
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().config_validation_errors.inc();
        Err(anyhow!(
            "config is not valid, total errors:{}, \n{}",
            errors.len(),
            errors.join("\n")
        ))
    }
}

fn validate_share(settings: &WidgetSettings, errors: &mut Vec<String>) {
    let share = &settings.share;

    if let Some(service_url) = &share.service_url {
        match Url::parse(service_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(format!(
                "share.service_url '{}' must use http or https, got '{}'",
                service_url,
                url.scheme()
            )),
            Err(e) => errors.push(format!("share.service_url '{}' is invalid: {}", service_url, e)),
        }
    }

    if share.default_share_amount == Some(0) {
        errors.push("share.default_share_amount must be a positive integer".to_string());
    }

    if let Some(target) = &share.target {
        if Url::parse(target).is_err() {
            errors.push(format!("share.target '{}' must be an absolute URL", target));
        }
    }

    for link in share.links.iter().flatten() {
        if link.parse::<Channel>().is_err() {
            errors.push(format!("share.links contains unknown channel '{}'", link));
        }
    }
}
