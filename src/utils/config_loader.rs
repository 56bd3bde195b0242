use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::proc_loader::file_to_settings;
use crate::config::settings::WidgetSettings;

pub async fn run(config_path: &str) -> Result<WidgetSettings> {
    let path = Path::new(config_path);
    file_to_settings(path).await.map_err(|e| anyhow!(format!("Invalid config format: {}", e)))
}
