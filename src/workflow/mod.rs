pub mod edge;
pub mod graph;
pub mod ids;
pub mod node;
pub mod serializer;

pub use edge::WorkflowConnection;
pub use graph::{DocumentState, WorkflowDocument, WorkflowId};
pub use node::{NodeKind, Position, WorkflowNode};
