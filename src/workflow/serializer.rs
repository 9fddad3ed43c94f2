use crate::error::{EditorError, EditorResult};
use crate::workflow::graph::{clamp_zoom, WorkflowDocument};
use std::collections::HashSet;

pub fn to_json(document: &WorkflowDocument) -> EditorResult<String> {
    serde_json::to_string_pretty(document)
        .map_err(|error| EditorError::Validation(error.to_string()))
}

/// Parses a document and checks it against the graph invariants. Zoom
/// outside the allowed range is clamped rather than rejected.
pub fn from_json(raw: &str) -> EditorResult<WorkflowDocument> {
    let mut document = serde_json::from_str::<WorkflowDocument>(raw)
        .map_err(|error| EditorError::Validation(error.to_string()))?;
    document.zoom_level = clamp_zoom(document.zoom_level);
    validate(&document)?;
    Ok(document)
}

pub fn validate(document: &WorkflowDocument) -> EditorResult<()> {
    let mut node_ids = HashSet::with_capacity(document.nodes.len());
    for node in &document.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(EditorError::Validation(format!("duplicate node id: {}", node.id)));
        }
    }

    let mut connection_ids = HashSet::with_capacity(document.connections.len());
    for conn in &document.connections {
        if !connection_ids.insert(conn.id.as_str()) {
            return Err(EditorError::Validation(format!("duplicate connection id: {}", conn.id)));
        }
        for endpoint in [&conn.source, &conn.target] {
            if !node_ids.contains(endpoint.as_str()) {
                return Err(EditorError::Validation(format!(
                    "connection {} references unknown node {}",
                    conn.id, endpoint
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::edge::WorkflowConnection;
    use crate::workflow::node::{NodeKind, Position, WorkflowNode};

    fn sample() -> WorkflowDocument {
        let mut document = WorkflowDocument::new();
        document.name = "Lead nurture".to_string();
        for (index, kind) in [NodeKind::Trigger, NodeKind::Condition, NodeKind::Action]
            .into_iter()
            .enumerate()
        {
            let offset = 100.0 + 50.0 * index as f64;
            document.push_node(WorkflowNode::new(
                format!("node-{}", index + 1),
                kind,
                Position::new(offset, offset),
            ));
        }
        document
            .push_connection(WorkflowConnection::new("conn-1", "node-1", "node-2"))
            .unwrap();
        let mut branch = WorkflowConnection::new("conn-2", "node-2", "node-3");
        branch.source_handle = Some("true".to_string());
        document.push_connection(branch).unwrap();
        document
    }

    #[test]
    fn export_then_import_preserves_graph() {
        let document = sample();
        let raw = to_json(&document).unwrap();
        assert!(raw.contains("\"zoom_level\""));
        assert!(raw.contains("\"source_handle\": \"true\""));
        assert_eq!(from_json(&raw).unwrap(), document);
    }

    #[test]
    fn import_rejects_dangling_connection() {
        let raw = r#"{
            "name": "broken",
            "nodes": [{ "id": "node-1", "type": "trigger", "position": { "x": 0, "y": 0 } }],
            "connections": [{ "id": "conn-1", "source": "node-1", "target": "node-2" }]
        }"#;
        let error = from_json(raw).unwrap_err();
        assert!(error.to_string().contains("unknown node node-2"));
    }

    #[test]
    fn import_rejects_duplicate_node_ids() {
        let raw = r#"{
            "nodes": [
                { "id": "node-1", "type": "trigger", "position": { "x": 0, "y": 0 } },
                { "id": "node-1", "type": "action", "position": { "x": 5, "y": 5 } }
            ]
        }"#;
        assert!(matches!(from_json(raw), Err(EditorError::Validation(_))));
    }

    #[test]
    fn import_clamps_zoom_and_fills_defaults() {
        let document = from_json(r#"{ "zoom_level": 9.0 }"#).unwrap();
        assert_eq!(document.zoom_level, 2.0);
        assert_eq!(document.name, "Untitled Workflow");
        assert!(document.id.is_none());
    }
}
