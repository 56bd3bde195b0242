use serde::Deserialize;

use crate::config::share::ShareConfigOverrides;
use crate::utils::constants::{DEFAULT_CLAIM_DELAY_MS, DEFAULT_POPUP_HEIGHT, DEFAULT_POPUP_WIDTH};

/// ================================
/// Widget-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct WidgetSettings {
    /// delay before the share-code injector claims a code
    #[serde(default = "default_claim_delay_ms")]
    pub claim_delay_ms: u64,
    #[serde(default)]
    pub popup: PopupConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub logging: Option<LoggingConfig>,
    /// caller-supplied share configuration, highest precedence
    #[serde(default)]
    pub share: ShareConfigOverrides,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            claim_delay_ms: default_claim_delay_ms(),
            popup: PopupConfig::default(),
            metrics: MetricsConfig::default(),
            logging: None,
            share: ShareConfigOverrides::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PopupConfig {
    #[serde(default = "default_popup_width")]
    pub width: u32,
    #[serde(default = "default_popup_height")]
    pub height: u32,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            width: default_popup_width(),
            height: default_popup_height(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MetricsConfig {
    #[serde(default)]
    pub is_enabled: bool,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new (level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_claim_delay_ms() -> u64 {
    DEFAULT_CLAIM_DELAY_MS
}

fn default_popup_width() -> u32 {
    DEFAULT_POPUP_WIDTH
}

fn default_popup_height() -> u32 {
    DEFAULT_POPUP_HEIGHT
}
