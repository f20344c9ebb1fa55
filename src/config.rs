use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::util::expand_tilde;

pub const DEFAULT_LIST_URL: &str = "http://localhost:8080/get-mods";
pub const DEFAULT_TEXTURES_URL: &str = "http://localhost:8080/generate-textures";
pub const DEFAULT_CODE_URL: &str = "http://localhost:8080/generate-mod";
pub const DEFAULT_COMPILE_URL: &str = "http://localhost:8080/compile-mod";

/// Length of the short name derived from a prompt.
pub const MOD_NAME_CHARS: usize = 30;

/// Addresses of the four remote collaborators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    pub list_mods: String,
    pub generate_textures: String,
    pub generate_code: String,
    pub compile: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            list_mods: DEFAULT_LIST_URL.into(),
            generate_textures: DEFAULT_TEXTURES_URL.into(),
            generate_code: DEFAULT_CODE_URL.into(),
            compile: DEFAULT_COMPILE_URL.into(),
        }
    }
}

impl Endpoints {
    /// All four endpoints under one base URL, e.g. a local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            list_mods: format!("{base}/get-mods"),
            generate_textures: format!("{base}/generate-textures"),
            generate_code: format!("{base}/generate-mod"),
            compile: format!("{base}/compile-mod"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModcraftConfig {
    pub endpoints: Endpoints,
    pub request_timeout_secs: u64,
    pub default_mod_version: String,
    pub minecraft_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<String>,
}

impl Default for ModcraftConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            request_timeout_secs: 120,
            default_mod_version: "1.0.0".into(),
            minecraft_version: "1.20.1".into(),
            download_dir: None,
        }
    }
}

impl ModcraftConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Where downloaded jars go: the configured directory, else the OS
    /// download folder, else the working directory.
    pub fn resolve_download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return expand_tilde(dir);
        }
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".modcraft").join("config.json"))
}

/// Read a config file. A missing or unreadable file yields the defaults.
pub fn load_from(path: &Path) -> ModcraftConfig {
    let Ok(content) = std::fs::read_to_string(path) else {
        return ModcraftConfig::default();
    };
    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
            ModcraftConfig::default()
        }
    }
}

pub fn load() -> ModcraftConfig {
    config_path()
        .map(|p| load_from(&p))
        .unwrap_or_default()
}

pub fn save_to(path: &Path, config: &ModcraftConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "minecraftVersion": "1.19.4" }"#).unwrap();

        let config = load_from(&path);
        assert_eq!(config.minecraft_version, "1.19.4");
        assert_eq!(config.default_mod_version, "1.0.0");
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn test_missing_or_malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_from(&dir.path().join("nope.json")), ModcraftConfig::default());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert_eq!(load_from(&bad), ModcraftConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ModcraftConfig {
            download_dir: Some("/tmp/jars".into()),
            request_timeout_secs: 30,
            ..ModcraftConfig::default()
        };
        save_to(&path, &config).unwrap();
        assert_eq!(load_from(&path), config);
        assert_eq!(config.resolve_download_dir(), PathBuf::from("/tmp/jars"));
    }

    #[test]
    fn test_endpoints_with_base() {
        let e = Endpoints::with_base("http://127.0.0.1:9000/");
        assert_eq!(e.compile, "http://127.0.0.1:9000/compile-mod");
        assert_eq!(e.list_mods, "http://127.0.0.1:9000/get-mods");
    }
}
