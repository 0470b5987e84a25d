use sift_core::enums::{Decision, ScreeningStatus};
use sift_db::repos::candidate::CandidateFilter;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CandidateCommands;
use crate::commands::shared::parse::parse_optional_enum;
use crate::commands::shared::project::require_project;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift candidate`.
pub async fn handle(
    action: &CandidateCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let project_id = require_project(flags)?;
    match action {
        CandidateCommands::List {
            decision,
            status,
            confirmed,
            limit,
        } => {
            let filter = CandidateFilter {
                decision: parse_optional_enum::<Decision>(decision.as_deref(), "decision")?,
                screening_status: parse_optional_enum::<ScreeningStatus>(
                    status.as_deref(),
                    "status",
                )?,
                user_confirmed: *confirmed,
                limit: Some(ctx.limit(*limit, flags.limit)),
            };
            let candidates = ctx.service.list_candidates(project_id, &filter).await?;
            output(&candidates, flags.format)
        }
        CandidateCommands::Show { id } => {
            let candidate = ctx.service.get_candidate(project_id, id).await?;
            output(&candidate, flags.format)
        }
        CandidateCommands::Progress => {
            let progress = ctx.service.screening_progress(project_id).await?;
            output(&progress, flags.format)
        }
    }
}
