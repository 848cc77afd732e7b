use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:9090";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Value of the server's session cookie (e.g. `JSESSIONID=...`), copied
    /// from a browser session after signing in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            session_cookie: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Defaults, then the config file if there is one, then `INBOX_API_URL`
    /// and `INBOX_SESSION` from the environment.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config at {}", path.display()))?;
                Self::parse(&contents)?
            }
            _ => Self::default(),
        };

        config.apply_overrides(
            std::env::var("INBOX_API_URL").ok(),
            std::env::var("INBOX_SESSION").ok(),
        );
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).with_context(|| "Failed to parse config.toml")
    }

    fn apply_overrides(&mut self, api_url: Option<String>, session: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(cookie) = session.filter(|c| !c.trim().is_empty()) {
            self.session_cookie = Some(cookie.trim().to_string());
        }
    }

    pub fn generate_default() -> Result<PathBuf> {
        let path = Self::config_path()
            .with_context(|| "Could not determine config directory")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(&Config::default())?;
        std::fs::write(&path, toml_str)?;
        Ok(path)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("inbox-tui").join("config.toml"))
    }
}
