//! Workflow API client implementation using reqwest.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::session::Session;
use crate::api::wire::{
    Envelope, ErrorBody, SaveWorkflowRequest, SaveWorkflowResponse, StatusFilter, ToggleResponse,
    WorkflowRecord, WorkflowSummary, WorkflowTemplate,
};
use crate::api::WorkflowApi;
use crate::config::AppConfig;
use crate::error::{EditorError, EditorResult};
use crate::workflow::{WorkflowDocument, WorkflowId};

/// Tracing target for backend calls.
pub const TRACING_TARGET: &str = "xordon_flow::api";

struct HttpWorkflowApiInner {
    http: Client,
    base_url: String,
    session: Session,
}

impl std::fmt::Debug for HttpWorkflowApiInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWorkflowApiInner")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// HTTP/JSON client for the workflow backend.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Examples
///
/// ```rust,ignore
/// let config = AppConfig::load(None)?;
/// let api = HttpWorkflowApi::new(&config)?;
/// let document = api.fetch(&WorkflowId::from(42)).await?;
/// ```
#[derive(Clone, Debug)]
pub struct HttpWorkflowApi {
    inner: Arc<HttpWorkflowApiInner>,
}

impl HttpWorkflowApi {
    /// Builds a client from the app configuration, taking the session from
    /// its token and workspace fields.
    pub fn new(config: &AppConfig) -> EditorResult<Self> {
        config.validate()?;
        Self::with_session(
            &config.api_base_url,
            Session::from_config(config),
            config.timeout(),
            &config.user_agent,
        )
    }

    pub fn with_session(
        base_url: &str,
        session: Session,
        timeout: Duration,
        user_agent: &str,
    ) -> EditorResult<Self> {
        tracing::debug!(
            target: TRACING_TARGET,
            base_url,
            timeout_ms = timeout.as_millis() as u64,
            "Creating workflow API client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpWorkflowApiInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                session,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        self.inner.session.apply(self.inner.http.request(method, url))
    }

    async fn send(&self, request: RequestBuilder, resource: &str) -> EditorResult<Response> {
        let response = request.send().await.map_err(|error| {
            tracing::warn!(target: TRACING_TARGET, resource, error = %error, "Request failed");
            EditorError::from(error)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            target: TRACING_TARGET,
            resource,
            status = status.as_u16(),
            "Backend returned an error status"
        );
        Err(status_error(status, resource, &body))
    }

    async fn decode<T: DeserializeOwned>(response: Response, resource: &str) -> EditorResult<T> {
        let body = response.text().await?;
        serde_json::from_str::<Envelope<T>>(&body)
            .map(Envelope::into_inner)
            .map_err(|error| EditorError::Decode(format!("{resource}: {error}")))
    }
}

fn status_error(status: StatusCode, resource: &str, body: &str) -> EditorError {
    if status == StatusCode::NOT_FOUND {
        return EditorError::NotFound(resource.to_string());
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });

    EditorError::Http {
        status: status.as_u16(),
        message,
    }
}

#[async_trait::async_trait]
impl WorkflowApi for HttpWorkflowApi {
    async fn fetch(&self, id: &WorkflowId) -> EditorResult<WorkflowDocument> {
        let resource = format!("workflow {id}");
        tracing::debug!(target: TRACING_TARGET, workflow_id = %id, "Fetching workflow");

        let response = self
            .send(self.request(Method::GET, &format!("workflows/{id}")), &resource)
            .await?;
        let record: WorkflowRecord = Self::decode(response, &resource).await?;
        Ok(record.into_document(id))
    }

    async fn save(&self, request: &SaveWorkflowRequest) -> EditorResult<WorkflowId> {
        let (method, path) = match &request.workflow_id {
            Some(id) => (Method::PUT, format!("workflows/{id}")),
            None => (Method::POST, "workflows".to_string()),
        };
        let resource = match &request.workflow_id {
            Some(id) => format!("workflow {id}"),
            None => "new workflow".to_string(),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            %method,
            nodes = request.nodes.len(),
            connections = request.connections.len(),
            "Saving workflow"
        );

        let response = self
            .send(self.request(method, &path).json(request), &resource)
            .await?;
        let saved: SaveWorkflowResponse = Self::decode(response, &resource).await?;
        let id = saved
            .into_id()
            .or_else(|| request.workflow_id.clone())
            .ok_or_else(|| {
                EditorError::Decode(format!("{resource}: response has no workflow_id"))
            })?;

        tracing::info!(target: TRACING_TARGET, workflow_id = %id, "Workflow saved");
        Ok(id)
    }

    async fn templates(&self) -> EditorResult<Vec<WorkflowTemplate>> {
        let resource = "workflow templates";
        let response = self
            .send(self.request(Method::GET, "workflow-templates"), resource)
            .await?;
        Self::decode(response, resource).await
    }

    async fn list(&self, status: Option<StatusFilter>) -> EditorResult<Vec<WorkflowSummary>> {
        let resource = "workflows";
        let mut request = self.request(Method::GET, "workflows");
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        let response = self.send(request, resource).await?;
        Self::decode(response, resource).await
    }

    async fn delete(&self, id: &WorkflowId) -> EditorResult<()> {
        let resource = format!("workflow {id}");
        self.send(self.request(Method::DELETE, &format!("workflows/{id}")), &resource)
            .await?;
        tracing::info!(target: TRACING_TARGET, workflow_id = %id, "Workflow deleted");
        Ok(())
    }

    async fn toggle(&self, id: &WorkflowId) -> EditorResult<bool> {
        let resource = format!("workflow {id}");
        let response = self
            .send(self.request(Method::POST, &format!("workflows/{id}/toggle")), &resource)
            .await?;
        let toggled: ToggleResponse = Self::decode(response, &resource).await?;
        Ok(toggled.is_active)
    }
}
