use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::api::{HttpWorkflowApi, StatusFilter, WorkflowApi};
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::editor::WorkflowGraphEditor;
use crate::error::{EditorError, EditorResult};
use crate::workflow::{serializer, WorkflowDocument, WorkflowId};

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(
        cli.base_url,
        cli.token,
        cli.workspace,
    );
    let api: Arc<dyn WorkflowApi> = Arc::new(HttpWorkflowApi::new(&config)?);

    let output = match cli.command {
        Commands::List { status } => list_workflows(api, status.map(StatusFilter::from)).await?,
        Commands::Show { id } => show_workflow(api, &id).await?,
        Commands::Export { id, path } => export_workflow(api, &id, &path).await?,
        Commands::Import { path, as_new } => import_workflow(api, &path, as_new).await?,
        Commands::Delete { id } => delete_workflow(api, &id).await?,
        Commands::Toggle { id } => toggle_workflow(api, &id).await?,
        Commands::Templates => list_templates(api).await?,
    };

    print!("{output}");
    Ok(())
}

pub async fn list_workflows(
    api: Arc<dyn WorkflowApi>,
    status: Option<StatusFilter>,
) -> EditorResult<String> {
    let workflows = api.list(status).await?;
    let mut out = String::new();
    if workflows.is_empty() {
        out.push_str("No workflows found.\n");
        return Ok(out);
    }
    for workflow in workflows {
        let state = if workflow.is_active { "active" } else { "inactive" };
        let _ = write!(out, "{:>6}  {:<8}  {}", workflow.id, state, workflow.name);
        if let Some(steps) = workflow.step_count {
            let _ = write!(out, " ({steps} steps)");
        }
        out.push('\n');
    }
    Ok(out)
}

pub async fn show_workflow(api: Arc<dyn WorkflowApi>, id: &WorkflowId) -> EditorResult<String> {
    let mut editor = WorkflowGraphEditor::new(api);
    let document = editor.load(id).await?;
    Ok(describe(document))
}

pub fn describe(document: &WorkflowDocument) -> String {
    let mut out = String::new();
    let id = document
        .id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unsaved".to_string());
    let _ = writeln!(out, "{} [{}] zoom {:.1}", document.name, id, document.zoom_level);
    let _ = writeln!(out, "nodes: {}", document.nodes.len());
    for node in &document.nodes {
        let _ = writeln!(
            out,
            "  {} {} @ ({}, {})",
            node.id, node.kind, node.position.x, node.position.y
        );
    }
    let _ = writeln!(out, "connections: {}", document.connections.len());
    for conn in &document.connections {
        match &conn.source_handle {
            Some(handle) => {
                let _ = writeln!(out, "  {} -[{}]-> {}", conn.source, handle, conn.target);
            }
            None => {
                let _ = writeln!(out, "  {} -> {}", conn.source, conn.target);
            }
        }
    }
    out
}

pub async fn export_workflow(
    api: Arc<dyn WorkflowApi>,
    id: &WorkflowId,
    path: &Path,
) -> EditorResult<String> {
    let mut editor = WorkflowGraphEditor::new(api);
    let payload = serializer::to_json(editor.load(id).await?)?;
    std::fs::write(path, payload).map_err(|error| EditorError::Io(error.to_string()))?;
    Ok(format!("Exported workflow {id} to {}\n", path.display()))
}

pub async fn import_workflow(
    api: Arc<dyn WorkflowApi>,
    path: &Path,
    as_new: bool,
) -> EditorResult<String> {
    let payload =
        std::fs::read_to_string(path).map_err(|error| EditorError::Io(error.to_string()))?;
    let mut document = serializer::from_json(&payload)?;
    if as_new {
        document.id = None;
    }

    let mut editor = WorkflowGraphEditor::with_document(api, document)?;
    let saved = editor.save().await?;
    let id = saved.id.as_ref().map(ToString::to_string).unwrap_or_default();
    Ok(format!("Saved workflow {id}\n"))
}

pub async fn delete_workflow(api: Arc<dyn WorkflowApi>, id: &WorkflowId) -> EditorResult<String> {
    api.delete(id).await?;
    Ok(format!("Deleted workflow {id}\n"))
}

pub async fn toggle_workflow(api: Arc<dyn WorkflowApi>, id: &WorkflowId) -> EditorResult<String> {
    let active = api.toggle(id).await?;
    let state = if active { "active" } else { "inactive" };
    Ok(format!("Workflow {id} is now {state}\n"))
}

pub async fn list_templates(api: Arc<dyn WorkflowApi>) -> EditorResult<String> {
    let editor = WorkflowGraphEditor::new(api);
    let templates = editor.templates().await?;
    let mut out = String::new();
    for template in templates {
        let _ = write!(out, "{:>6}  {}", template.id, template.name);
        if let Some(category) = &template.category {
            let _ = write!(out, " [{category}]");
        }
        if !template.has_graph() {
            out.push_str(" (no graph)");
        }
        out.push('\n');
    }
    Ok(out)
}
