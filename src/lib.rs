pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod notify;
pub mod workflow;

pub use editor::WorkflowGraphEditor;
pub use error::{EditorError, EditorResult};
