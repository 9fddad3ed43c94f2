use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::api::StatusFilter;
use crate::workflow::WorkflowId;

#[derive(Parser, Debug)]
#[command(name = "xordon-flow")]
#[command(version, about = "Edit and manage Xordon workflow graphs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/xordon-flow/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "XORDON_API_URL")]
    pub base_url: Option<String>,

    /// Bearer token for the backend
    #[arg(long, global = true, env = "XORDON_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Workspace (tenant) id
    #[arg(long, global = true, env = "XORDON_WORKSPACE_ID")]
    pub workspace: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for StatusFilter {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => StatusFilter::Active,
            StatusArg::Inactive => StatusFilter::Inactive,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List workflows
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },

    /// Print the graph of a workflow
    Show { id: WorkflowId },

    /// Write a workflow to a JSON file
    Export { id: WorkflowId, path: PathBuf },

    /// Validate a JSON file and save it to the backend
    Import {
        path: PathBuf,
        /// Save as a new workflow even if the file carries an id
        #[arg(long)]
        as_new: bool,
    },

    /// Delete a workflow
    Delete { id: WorkflowId },

    /// Flip a workflow between active and inactive
    Toggle { id: WorkflowId },

    /// List workflow templates
    Templates,
}
