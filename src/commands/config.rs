use crate::config::{self, ModcraftConfig};
use crate::error::{ModcraftError, Result};

#[tauri::command]
pub async fn load_config() -> ModcraftConfig {
    config::load()
}

/// Persist settings. Endpoint and timeout changes apply on next launch.
#[tauri::command]
pub async fn save_config(new_config: ModcraftConfig) -> Result<ModcraftConfig> {
    let path = config::config_path()
        .ok_or_else(|| ModcraftError::Custom("Cannot find home directory".into()))?;
    config::save_to(&path, &new_config)?;
    Ok(new_config)
}
