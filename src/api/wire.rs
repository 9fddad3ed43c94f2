//! Request and response bodies exchanged with the workflow backend.

use crate::workflow::{WorkflowConnection, WorkflowDocument, WorkflowId, WorkflowNode};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full-document save body. `workflow_id` is absent for documents the
/// backend has not seen yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveWorkflowRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<WorkflowId>,
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    pub connections: Vec<WorkflowConnection>,
    pub zoom_level: f64,
}

impl From<&WorkflowDocument> for SaveWorkflowRequest {
    fn from(document: &WorkflowDocument) -> Self {
        Self {
            workflow_id: document.id.clone(),
            name: document.name.clone(),
            nodes: document.nodes.clone(),
            connections: document.connections.clone(),
            zoom_level: document.zoom_level,
        }
    }
}

impl SaveWorkflowRequest {
    pub fn into_document(self) -> WorkflowDocument {
        WorkflowDocument {
            id: self.workflow_id,
            name: self.name,
            nodes: self.nodes,
            connections: self.connections,
            zoom_level: self.zoom_level,
        }
    }
}

/// A workflow as the backend returns it from `GET workflows/{id}`.
///
/// Unlike [`WorkflowDocument`], every graph field is required here: a body
/// missing any of them is not a workflow and must not hydrate the editor.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WorkflowRecord {
    #[serde(default)]
    pub id: Option<WorkflowId>,
    pub name: String,
    pub nodes: Vec<WorkflowNode>,
    pub connections: Vec<WorkflowConnection>,
    pub zoom_level: f64,
}

impl WorkflowRecord {
    /// Falls back to `requested` when the body does not echo its id.
    pub fn into_document(self, requested: &WorkflowId) -> WorkflowDocument {
        WorkflowDocument {
            id: Some(self.id.unwrap_or_else(|| requested.clone())),
            name: self.name,
            nodes: self.nodes,
            connections: self.connections,
            zoom_level: self.zoom_level,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SaveWorkflowResponse {
    #[serde(default)]
    pub workflow_id: Option<WorkflowId>,
    #[serde(default)]
    pub id: Option<WorkflowId>,
}

impl SaveWorkflowResponse {
    pub fn into_id(self) -> Option<WorkflowId> {
        self.workflow_id.or(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub connections: Vec<WorkflowConnection>,
}

impl WorkflowTemplate {
    pub fn has_graph(&self) -> bool {
        !self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub step_count: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ToggleResponse {
    #[serde(deserialize_with = "lenient_flag")]
    pub is_active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message)
    }
}

/// The backend wraps most payloads in `{"data": ...}`; some routes answer bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

// MySQL rows come back with flags as 0/1, "0"/"1" or real booleans.
fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
        Value::String(text) => matches!(text.as_str(), "1" | "true" | "yes"),
        _ => false,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    })
}
