//! Persistence collaborator for the workflow editor.

pub mod client;
pub mod session;
pub mod wire;

use crate::error::EditorResult;
use crate::workflow::{WorkflowDocument, WorkflowId};

pub use client::HttpWorkflowApi;
pub use session::Session;
pub use wire::{SaveWorkflowRequest, StatusFilter, WorkflowSummary, WorkflowTemplate};

/// Backend operations the editor and command surface depend on.
#[async_trait::async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn fetch(&self, id: &WorkflowId) -> EditorResult<WorkflowDocument>;

    /// Persists the full document and returns the authoritative id.
    async fn save(&self, request: &SaveWorkflowRequest) -> EditorResult<WorkflowId>;

    async fn templates(&self) -> EditorResult<Vec<WorkflowTemplate>>;

    async fn list(&self, status: Option<StatusFilter>) -> EditorResult<Vec<WorkflowSummary>>;

    async fn delete(&self, id: &WorkflowId) -> EditorResult<()>;

    /// Flips the active flag and returns the new value.
    async fn toggle(&self, id: &WorkflowId) -> EditorResult<bool>;
}
