use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::{CandidateCommands, IncludedCommands, ProjectCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Review projects.
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// Ingest a JSON array of search results into the current project.
    Ingest(IngestArgs),
    /// Screening candidates.
    Candidate {
        #[command(subcommand)]
        action: CandidateCommands,
    },
    /// Record automated (unconfirmed) screening decisions.
    Decide(DecideArgs),
    /// Confirm a screening decision.
    Confirm(ConfirmArgs),
    /// Included studies.
    Included {
        #[command(subcommand)]
        action: IncludedCommands,
    },
    /// PRISMA counters for the current project.
    Stats,
    /// Query the audit trail.
    Audit(AuditArgs),
    /// Dump the JSON schema for a registered type (or list names).
    Schema(SchemaArgs),
}

/// Arguments for `sift ingest`.
#[derive(Clone, Debug, Args)]
pub struct IngestArgs {
    /// JSON file holding an array of papers (`-` for stdin)
    pub file: PathBuf,
}

/// Arguments for `sift decide`.
#[derive(Clone, Debug, Args)]
pub struct DecideArgs {
    /// Candidate to decide on
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub candidate_id: Option<String>,
    /// include, exclude, or uncertain
    #[arg(required_unless_present = "file")]
    pub decision: Option<String>,
    #[arg(long)]
    pub justification: Option<String>,
    #[arg(long)]
    pub confidence: Option<String>,
    #[arg(long)]
    pub subtopic: Option<String>,
    /// JSON file holding a classifier response (array of verdicts)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for `sift confirm`.
#[derive(Clone, Debug, Args)]
pub struct ConfirmArgs {
    pub candidate_id: String,
    /// include, exclude, or uncertain
    pub decision: String,
}

/// Arguments for `sift audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
}

/// Arguments for `sift schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Registered type name; omit to list all names
    pub type_name: Option<String>,
}
