use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Trigger,
    Action,
    Condition,
    Delay,
    Split,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Trigger,
        NodeKind::Action,
        NodeKind::Condition,
        NodeKind::Delay,
        NodeKind::Split,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Trigger => "trigger",
            NodeKind::Action => "action",
            NodeKind::Condition => "condition",
            NodeKind::Delay => "delay",
            NodeKind::Split => "split",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub config: HashMap<String, Value>,
    #[serde(default)]
    pub position: Position,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            config: HashMap::new(),
            position,
        }
    }
}
