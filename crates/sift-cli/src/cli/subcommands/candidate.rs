use clap::Subcommand;

/// Screening candidate commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CandidateCommands {
    /// List candidates.
    List {
        #[arg(long)]
        decision: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        confirmed: Option<bool>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a candidate.
    Show { id: String },
    /// Candidate counts per screening state and decision.
    Progress,
}
