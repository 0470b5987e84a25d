use anyhow::Context;
use sift_core::entities::ExternalPaper;
use sift_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::IngestArgs;
use crate::commands::shared::input::read_json;
use crate::commands::shared::project::require_project;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift ingest`.
///
/// The whole file is checked against the `external_paper` schema before any
/// paper is stored, so a malformed batch changes nothing.
pub async fn handle(args: &IngestArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let project_id = require_project(flags)?;
    let value = read_json(&args.file)?;

    SchemaRegistry::new()
        .validate_each("external_paper", &value)
        .with_context(|| format!("{} does not hold valid papers", args.file.display()))?;
    let papers: Vec<ExternalPaper> =
        serde_json::from_value(value).context("failed to decode papers")?;

    let report = ctx.service.ingest(project_id, &papers).await?;
    output(&report, flags.format)
}
