use clap::Subcommand;

/// Review project commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProjectCommands {
    /// Create a project.
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// List projects.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a project.
    Show { id: String },
    /// Update a project.
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        completed_tasks: Option<u32>,
        #[arg(long)]
        total_tasks: Option<u32>,
    },
    /// Delete a project and everything it owns.
    Delete { id: String },
}
