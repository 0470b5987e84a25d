use clap::Subcommand;

/// Included study commands.
#[derive(Clone, Debug, Subcommand)]
pub enum IncludedCommands {
    /// List included studies.
    List {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show an included study.
    Show { id: String },
    /// Update appraisal or extraction progress.
    Update {
        id: String,
        #[arg(long)]
        quality: Option<String>,
        #[arg(long)]
        extraction: Option<String>,
    },
    /// Rebuild the projection from confirmed decisions.
    Reconcile,
}
