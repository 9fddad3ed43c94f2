//! In-memory workflow graph editor.
//!
//! All graph mutations are synchronous and local. Nothing reaches the
//! backend until [`WorkflowGraphEditor::save`] is called, and a failed
//! [`load`](WorkflowGraphEditor::load) or `save` leaves the document as it
//! was.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::api::{SaveWorkflowRequest, WorkflowApi, WorkflowTemplate};
use crate::error::{EditorError, EditorResult};
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::workflow::graph::{cascade_position, clamp_zoom, DEFAULT_NAME, ZOOM_STEP};
use crate::workflow::ids::{IdGenerator, CONNECTION_PREFIX, NODE_PREFIX};
use crate::workflow::serializer;
use crate::workflow::{NodeKind, WorkflowConnection, WorkflowDocument, WorkflowId, WorkflowNode};

pub const TRACING_TARGET: &str = "xordon_flow::editor";

pub struct WorkflowGraphEditor {
    document: WorkflowDocument,
    selected: Option<String>,
    ids: IdGenerator,
    api: Arc<dyn WorkflowApi>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for WorkflowGraphEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowGraphEditor")
            .field("document", &self.document)
            .field("selected", &self.selected)
            .finish_non_exhaustive()
    }
}

impl WorkflowGraphEditor {
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self {
            document: WorkflowDocument::new(),
            selected: None,
            ids: IdGenerator::from_clock(),
            api,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Starts from an existing document, held to the same rules as a loaded
    /// one: zoom is clamped and a document with duplicate ids or dangling
    /// connections is refused.
    pub fn with_document(
        api: Arc<dyn WorkflowApi>,
        mut document: WorkflowDocument,
    ) -> EditorResult<Self> {
        document.zoom_level = clamp_zoom(document.zoom_level);
        serializer::validate(&document)?;
        Ok(Self {
            document,
            ..Self::new(api)
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    pub fn document(&self) -> &WorkflowDocument {
        &self.document
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Replaces the local document with the persisted one. On failure the
    /// current document is kept and a notice is raised.
    pub async fn load(&mut self, id: &WorkflowId) -> EditorResult<&WorkflowDocument> {
        tracing::debug!(target: TRACING_TARGET, workflow_id = %id, "Loading workflow");

        let fetched = self
            .api
            .fetch(id)
            .await
            .and_then(|mut fetched| {
                fetched.zoom_level = clamp_zoom(fetched.zoom_level);
                serializer::validate(&fetched)?;
                Ok(fetched)
            });

        match fetched {
            Ok(fetched) => {
                self.document = WorkflowDocument {
                    id: Some(fetched.id.unwrap_or_else(|| id.clone())),
                    ..fetched
                };
                self.selected = None;
                tracing::info!(
                    target: TRACING_TARGET,
                    workflow_id = %id,
                    nodes = self.document.nodes.len(),
                    connections = self.document.connections.len(),
                    "Workflow loaded"
                );
                Ok(&self.document)
            }
            Err(error) => {
                let error = EditorError::LoadFailure(error.to_string());
                self.notifier.notify(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    /// Submits the whole document. An unsaved document adopts the id the
    /// backend assigns; a saved one keeps whatever id the backend confirms.
    pub async fn save(&mut self) -> EditorResult<&WorkflowDocument> {
        let request = SaveWorkflowRequest::from(&self.document);

        match self.api.save(&request).await {
            Ok(id) => {
                if self.document.id.is_none() {
                    tracing::info!(target: TRACING_TARGET, workflow_id = %id, "Workflow created");
                }
                self.document.id = Some(id);
                self.notifier.notify(Notice::success("Workflow saved"));
                Ok(&self.document)
            }
            Err(error) => {
                let error = EditorError::SaveFailure(error.to_string());
                self.notifier.notify(Notice::error(error.to_string()));
                Err(error)
            }
        }
    }

    pub async fn templates(&self) -> EditorResult<Vec<WorkflowTemplate>> {
        self.api.templates().await.map_err(|error| {
            let error = EditorError::LoadFailure(error.to_string());
            self.notifier.notify(Notice::error(error.to_string()));
            error
        })
    }

    pub fn add_node(&mut self, kind: NodeKind) -> String {
        let document = &self.document;
        let id = self.ids.next_id(NODE_PREFIX, |candidate| document.is_id_taken(candidate));
        let position = cascade_position(self.document.nodes.len());
        self.document.push_node(WorkflowNode::new(id.clone(), kind, position));
        tracing::trace!(target: TRACING_TARGET, node_id = %id, %kind, "Node added");
        id
    }

    pub fn delete_node(&mut self, node_id: &str) {
        if self.document.remove_node(node_id) {
            tracing::trace!(target: TRACING_TARGET, node_id, "Node deleted");
        }
        if self.selected.as_deref() == Some(node_id) {
            self.selected = None;
        }
    }

    pub fn connect_nodes(&mut self, source: &str, target: &str) -> EditorResult<String> {
        self.connect(source, target, None)
    }

    /// Connects a specific outgoing branch, e.g. the `"false"` side of a condition.
    pub fn connect_branch(
        &mut self,
        source: &str,
        target: &str,
        handle: impl Into<String>,
    ) -> EditorResult<String> {
        self.connect(source, target, Some(handle.into()))
    }

    fn connect(
        &mut self,
        source: &str,
        target: &str,
        handle: Option<String>,
    ) -> EditorResult<String> {
        for endpoint in [source, target] {
            if !self.document.contains_node(endpoint) {
                tracing::debug!(
                    target: TRACING_TARGET,
                    endpoint,
                    "Rejected connection to unknown node"
                );
                return Err(EditorError::InvalidConnectionEndpoint(endpoint.to_string()));
            }
        }

        let document = &self.document;
        let id = self
            .ids
            .next_id(CONNECTION_PREFIX, |candidate| document.is_id_taken(candidate));
        let mut connection = WorkflowConnection::new(id.clone(), source, target);
        connection.source_handle = handle;
        self.document.push_connection(connection)?;
        Ok(id)
    }

    pub fn disconnect(&mut self, connection_id: &str) {
        self.document.remove_connection(connection_id);
    }

    pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) {
        self.document.move_node(node_id, x, y);
    }

    pub fn set_zoom(&mut self, delta: f64) -> f64 {
        self.document.adjust_zoom(delta)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(-ZOOM_STEP)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.document.name = name.into();
    }

    pub fn select(&mut self, node_id: &str) {
        if self.document.contains_node(node_id) {
            self.selected = Some(node_id.to_string());
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Properties-panel hook. Returns `false` for an unknown node.
    pub fn set_node_config(&mut self, node_id: &str, config: HashMap<String, Value>) -> bool {
        match self.document.node_mut(node_id) {
            Some(node) => {
                node.config = config;
                true
            }
            None => false,
        }
    }

    /// Replaces the graph with the template's, minting fresh ids. Templates
    /// without a graph leave the document alone and return `false`.
    pub fn apply_template(&mut self, template: &WorkflowTemplate) -> bool {
        if !template.has_graph() {
            tracing::debug!(
                target: TRACING_TARGET,
                template_id = %template.id,
                "Template has no graph"
            );
            self.notifier.notify(Notice::info(format!(
                "Template \"{}\" has no graph to apply",
                template.name
            )));
            return false;
        }

        let mut next = WorkflowDocument {
            id: self.document.id.clone(),
            name: self.document.name.clone(),
            nodes: Vec::with_capacity(template.nodes.len()),
            connections: Vec::with_capacity(template.connections.len()),
            zoom_level: self.document.zoom_level,
        };
        if next.name == DEFAULT_NAME {
            next.name = template.name.clone();
        }

        let mut remapped = HashMap::with_capacity(template.nodes.len());
        for node in &template.nodes {
            if remapped.contains_key(&node.id) {
                continue;
            }
            let id = self.ids.next_id(NODE_PREFIX, |candidate| {
                next.is_id_taken(candidate) || self.document.is_id_taken(candidate)
            });
            remapped.insert(node.id.clone(), id.clone());
            next.push_node(WorkflowNode { id, ..node.clone() });
        }

        for conn in &template.connections {
            let (Some(source), Some(target)) =
                (remapped.get(&conn.source), remapped.get(&conn.target))
            else {
                continue;
            };
            let id = self.ids.next_id(CONNECTION_PREFIX, |candidate| {
                next.is_id_taken(candidate) || self.document.is_id_taken(candidate)
            });
            let mut connection = WorkflowConnection::new(id, source.clone(), target.clone());
            connection.source_handle = conn.source_handle.clone();
            next.connections.push(connection);
        }

        self.document = next;
        self.selected = None;
        true
    }

    pub fn reset(&mut self) {
        self.document = WorkflowDocument::new();
        self.selected = None;
    }
}
