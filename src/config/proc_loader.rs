use std::path::Path;
use crate::config::proc_validator::validate_settings;
use crate::config::settings::{LogFormat, LoggingConfig, WidgetSettings};
use crate::observability::metrics::get_metrics;
use anyhow::Result;
use regex::Regex;
use tracing::{debug, error};

/// Load and validate settings from a YAML file
pub async fn file_to_settings(path: &Path) -> Result<WidgetSettings> {
    let content = tokio::fs::read_to_string(path).await?;

    let expanded = expand_env_vars(&content)?;
    parse_settings(expanded)
}

pub fn parse_settings(content: String) -> Result<WidgetSettings> {
    let mut settings: WidgetSettings = serde_yaml::from_str(&content)
        .inspect_err(|e| {
            error!("parse config error: {}", e);
            get_metrics().parse_failures.inc();
        })?;

    // Apply defaults
    if settings.logging.is_none() {
        settings.logging = Some(LoggingConfig::new("info".to_owned(), LogFormat::Compact));
    }
    debug!("validation config ...");
    validate_settings(&settings)?;

    Ok(settings)
}

/// Expand `${VAR}` and `${VAR:default}` from the process environment.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
