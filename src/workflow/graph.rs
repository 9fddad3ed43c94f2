use crate::error::{EditorError, EditorResult};
use crate::workflow::edge::WorkflowConnection;
use crate::workflow::node::{Position, WorkflowNode};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_NAME: &str = "Untitled Workflow";
pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;
pub const DEFAULT_ZOOM: f64 = 1.0;
pub const ZOOM_STEP: f64 = 0.1;

const CASCADE_ORIGIN: f64 = 100.0;
const CASCADE_STEP: f64 = 50.0;

/// Backend-assigned workflow identifier.
///
/// The backend hands out numeric ids but older payloads quote them, so both
/// forms are accepted. Only canonical decimal ids (no sign, no leading zero)
/// go back out as JSON numbers; anything else keeps its exact text.
///
/// Ids end up as a URL path segment, so they must be non-empty and free of
/// whitespace and the `/ ? # %` delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkflowId(String);

impl WorkflowId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_number(&self) -> Option<u64> {
        let number = self.0.parse::<u64>().ok()?;
        (number.to_string() == self.0).then_some(number)
    }

    fn check(id: &str) -> Result<(), &'static str> {
        if id.is_empty() {
            return Err("workflow id must not be empty");
        }
        if id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'))
        {
            return Err("workflow id must be a single path segment");
        }
        Ok(())
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<u64> for WorkflowId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for WorkflowId {
    type Err = EditorError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        Self::check(id).map_err(|reason| EditorError::Validation(format!("{reason}: {id:?}")))?;
        Ok(Self(id.to_string()))
    }
}

impl Serialize for WorkflowId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_number() {
            Some(number) => serializer.serialize_u64(number),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for WorkflowId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl<'de> Visitor<'de> for IdVisitor {
            type Value = WorkflowId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a workflow id as a number or string")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<WorkflowId, E> {
                Ok(WorkflowId::from(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<WorkflowId, E> {
                Ok(WorkflowId(value.to_string()))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<WorkflowId, E> {
                WorkflowId::check(value).map_err(E::custom)?;
                Ok(WorkflowId(value.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    Unsaved,
    Saved,
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_zoom() -> f64 {
    DEFAULT_ZOOM
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        return DEFAULT_ZOOM;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Where the `index`-th node lands when it is added without an explicit
/// position: each one further down and right than the last.
pub fn cascade_position(index: usize) -> Position {
    let offset = CASCADE_ORIGIN + CASCADE_STEP * index as f64;
    Position::new(offset, offset)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkflowId>,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub connections: Vec<WorkflowConnection>,
    #[serde(default = "default_zoom")]
    pub zoom_level: f64,
}

impl Default for WorkflowDocument {
    fn default() -> Self {
        Self {
            id: None,
            name: default_name(),
            nodes: Vec::new(),
            connections: Vec::new(),
            zoom_level: DEFAULT_ZOOM,
        }
    }
}

impl WorkflowDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DocumentState {
        if self.id.is_some() {
            DocumentState::Saved
        } else {
            DocumentState::Unsaved
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|node| node.id == node_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.node(node_id).is_some()
    }

    pub fn contains_connection(&self, connection_id: &str) -> bool {
        self.connections.iter().any(|conn| conn.id == connection_id)
    }

    /// True when `id` is used by any node or connection.
    pub fn is_id_taken(&self, id: &str) -> bool {
        self.contains_node(id) || self.contains_connection(id)
    }

    pub fn push_node(&mut self, node: WorkflowNode) {
        self.nodes.push(node);
    }

    /// Removes the node and every connection touching it. Returns whether a
    /// node was removed.
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != node_id);
        if self.nodes.len() == before {
            return false;
        }
        self.connections.retain(|conn| !conn.touches(node_id));
        true
    }

    pub fn push_connection(&mut self, connection: WorkflowConnection) -> EditorResult<()> {
        for endpoint in [&connection.source, &connection.target] {
            if !self.contains_node(endpoint) {
                return Err(EditorError::InvalidConnectionEndpoint(endpoint.clone()));
            }
        }
        self.connections.push(connection);
        Ok(())
    }

    pub fn remove_connection(&mut self, connection_id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|conn| conn.id != connection_id);
        self.connections.len() != before
    }

    pub fn move_node(&mut self, node_id: &str, x: f64, y: f64) -> bool {
        match self.node_mut(node_id) {
            Some(node) => {
                node.position = Position::new(x, y);
                true
            }
            None => false,
        }
    }

    pub fn adjust_zoom(&mut self, delta: f64) -> f64 {
        self.zoom_level = clamp_zoom(self.zoom_level + delta);
        self.zoom_level
    }

    pub fn outgoing<'a>(
        &'a self,
        node_id: &'a str,
    ) -> impl Iterator<Item = &'a WorkflowConnection> + 'a {
        self.connections.iter().filter(move |conn| conn.source == node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::node::NodeKind;
    use serde_json::json;

    fn node(id: &str) -> WorkflowNode {
        WorkflowNode::new(id, NodeKind::Action, Position::default())
    }

    fn two_node_document() -> WorkflowDocument {
        let mut document = WorkflowDocument::new();
        document.push_node(node("node-a"));
        document.push_node(node("node-b"));
        document
            .push_connection(WorkflowConnection::new("conn-1", "node-a", "node-b"))
            .unwrap();
        document
    }

    #[test]
    fn new_document_is_unsaved_with_defaults() {
        let document = WorkflowDocument::new();
        assert_eq!(document.state(), DocumentState::Unsaved);
        assert_eq!(document.name, "Untitled Workflow");
        assert_eq!(document.zoom_level, 1.0);
    }

    #[test]
    fn cascade_positions_step_down_and_right() {
        assert_eq!(cascade_position(0), Position::new(100.0, 100.0));
        assert_eq!(cascade_position(1), Position::new(150.0, 150.0));
        assert_eq!(cascade_position(4), Position::new(300.0, 300.0));
    }

    #[test]
    fn removing_node_drops_touching_connections() {
        let mut document = two_node_document();
        document.push_node(node("node-c"));
        document
            .push_connection(WorkflowConnection::new("conn-2", "node-c", "node-a"))
            .unwrap();
        document
            .push_connection(WorkflowConnection::new("conn-3", "node-b", "node-c"))
            .unwrap();

        assert!(document.remove_node("node-a"));
        assert_eq!(document.connections.len(), 1);
        assert_eq!(document.connections[0].id, "conn-3");
    }

    #[test]
    fn removing_unknown_node_is_noop() {
        let mut document = two_node_document();
        let before = document.clone();
        assert!(!document.remove_node("node-x"));
        assert_eq!(document, before);
    }

    #[test]
    fn connection_with_unknown_endpoint_is_rejected() {
        let mut document = two_node_document();
        let error = document
            .push_connection(WorkflowConnection::new("conn-9", "node-x", "node-b"))
            .unwrap_err();
        assert!(matches!(error, EditorError::InvalidConnectionEndpoint(id) if id == "node-x"));
        assert_eq!(document.connections.len(), 1);
    }

    #[test]
    fn zoom_is_clamped_both_ways() {
        let mut document = WorkflowDocument::new();
        assert_eq!(document.adjust_zoom(5.0), MAX_ZOOM);
        assert_eq!(document.adjust_zoom(-10.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(f64::NAN), DEFAULT_ZOOM);
    }

    #[test]
    fn workflow_id_accepts_numbers_and_strings() {
        let numeric: WorkflowId = serde_json::from_value(json!(42)).unwrap();
        let quoted: WorkflowId = serde_json::from_value(json!("42")).unwrap();
        let opaque: WorkflowId = serde_json::from_value(json!("wf_abc")).unwrap();
        assert_eq!(numeric, quoted);
        assert_eq!(serde_json::to_value(&numeric).unwrap(), json!(42));
        assert_eq!(serde_json::to_value(&opaque).unwrap(), json!("wf_abc"));
        assert!(serde_json::from_value::<WorkflowId>(json!("")).is_err());
    }

    #[test]
    fn workflow_id_keeps_non_canonical_digits_as_text() {
        for text in ["007", "0042", "+5", "18446744073709551616"] {
            let id: WorkflowId = serde_json::from_value(json!(text)).unwrap();
            assert_eq!(serde_json::to_value(&id).unwrap(), json!(text));
            assert_eq!(id.as_str(), text);
        }
        let zero: WorkflowId = serde_json::from_value(json!("0")).unwrap();
        assert_eq!(serde_json::to_value(&zero).unwrap(), json!(0));
    }

    #[test]
    fn workflow_id_must_be_a_single_path_segment() {
        for bad in ["", "1/delete", "a b", "7?x=1", "7#top", "%2F", "tab\t"] {
            assert!(bad.parse::<WorkflowId>().is_err(), "{bad:?} was accepted");
            assert!(serde_json::from_value::<WorkflowId>(json!(bad)).is_err());
        }
        let error = "../42".parse::<WorkflowId>().unwrap_err();
        assert!(matches!(error, EditorError::Validation(_)));
        assert_eq!("wf_abc-1".parse::<WorkflowId>().unwrap().as_str(), "wf_abc-1");
        assert_eq!("42".parse::<WorkflowId>().unwrap(), WorkflowId::from(42));
    }

    #[test]
    fn document_uses_wire_field_names() {
        let document: WorkflowDocument = serde_json::from_value(json!({
            "id": 3,
            "name": "Welcome",
            "nodes": [],
            "connections": [],
            "zoom_level": 1.5
        }))
        .unwrap();
        assert_eq!(document.id, Some(WorkflowId::from(3)));
        assert_eq!(document.zoom_level, 1.5);
        assert_eq!(document.state(), DocumentState::Saved);
    }
}
