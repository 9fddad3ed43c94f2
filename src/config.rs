use crate::error::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub auth_token: Option<String>,
    pub workspace_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("xordon-flow/{}", env!("CARGO_PKG_VERSION")),
            auth_token: None,
            workspace_id: None,
        }
    }
}

impl AppConfig {
    /// `~/.config/xordon-flow/config.toml` on most platforms.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("xordon-flow").join("config.toml"))
    }

    /// Reads the config at `path`, or the default location when `path` is `None`.
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load(path: Option<&Path>) -> EditorResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let raw =
            std::fs::read_to_string(&path).map_err(|error| EditorError::Io(error.to_string()))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> EditorResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|error| EditorError::Validation(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EditorResult<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(EditorError::Validation("api_base_url must not be empty".to_string()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(EditorError::Validation(format!(
                "api_base_url must be an http(s) URL: {}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// Zero falls back to the default timeout.
    pub fn timeout(&self) -> Duration {
        if self.timeout_secs == 0 {
            Duration::from_secs(Self::default().timeout_secs)
        } else {
            Duration::from_secs(self.timeout_secs)
        }
    }

    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        token: Option<String>,
        workspace: Option<String>,
    ) -> Self {
        if let Some(base_url) = base_url {
            self.api_base_url = base_url;
        }
        if token.is_some() {
            self.auth_token = token;
        }
        if workspace.is_some() {
            self.workspace_id = workspace;
        }
        self
    }
}
