use sift_core::enums::Decision;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ConfirmArgs;
use crate::commands::shared::parse::parse_enum;
use crate::commands::shared::project::require_project;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift confirm`.
pub async fn handle(args: &ConfirmArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let project_id = require_project(flags)?;
    let decision = parse_enum::<Decision>(&args.decision, "decision")?;
    let response = ctx
        .service
        .confirm_decision(project_id, &args.candidate_id, decision)
        .await?;
    output(&response, flags.format)
}
