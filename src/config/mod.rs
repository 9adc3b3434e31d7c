use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub auth: Option<AuthConfig>,
    pub timeout: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub email: String,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            auth: None,
            timeout: 30,
            user_agent: format!("vidshelf/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/v1".to_string(),
            api_key: String::new(),
        }
    }
}

/// Config file looked up when `--config` is not given.
pub const DEFAULT_PATH: &str = "vidshelf.toml";

impl Config {
    /// Load from an explicit toml file, or from [`DEFAULT_PATH`] when none is
    /// given. An explicitly passed path must exist; a missing default file
    /// just means defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let default = Path::new(DEFAULT_PATH);
                if default.exists() {
                    Self::read(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
