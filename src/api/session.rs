use crate::config::AppConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;
use std::fmt;

pub const WORKSPACE_HEADER: &str = "X-Workspace-Id";

/// Tenant and credentials attached to every API request.
#[derive(Clone, Default)]
pub struct Session {
    token: Option<String>,
    workspace_id: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("workspace_id", &self.workspace_id)
            .finish()
    }
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            token: config.auth_token.clone().filter(|token| !token.is_empty()),
            workspace_id: config.workspace_id.clone().filter(|id| !id.is_empty()),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(workspace_id) = &self.workspace_id {
            request = request.header(WORKSPACE_HEADER, workspace_id);
        }
        request
    }
}
