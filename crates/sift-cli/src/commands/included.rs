use anyhow::bail;
use sift_core::enums::{ExtractionStatus, QualityStatus};
use sift_db::updates::included::IncludedStudyUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::IncludedCommands;
use crate::commands::shared::parse::parse_enum;
use crate::commands::shared::project::require_project;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift included`.
pub async fn handle(
    action: &IncludedCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let project_id = require_project(flags)?;
    match action {
        IncludedCommands::List { limit } => {
            let studies = ctx
                .service
                .list_included_studies(project_id, ctx.limit(*limit, flags.limit))
                .await?;
            output(&studies, flags.format)
        }
        IncludedCommands::Show { id } => {
            let study = ctx.service.get_included_study(project_id, id).await?;
            output(&study, flags.format)
        }
        IncludedCommands::Update {
            id,
            quality,
            extraction,
        } => {
            if quality.is_none() && extraction.is_none() {
                bail!("nothing to update: pass --quality or --extraction");
            }
            let mut builder = IncludedStudyUpdateBuilder::new();
            if let Some(raw) = quality {
                builder = builder.quality_status(parse_enum::<QualityStatus>(raw, "quality")?);
            }
            if let Some(raw) = extraction {
                builder =
                    builder.extraction_status(parse_enum::<ExtractionStatus>(raw, "extraction")?);
            }
            let study = ctx
                .service
                .update_included_study(project_id, id, builder.build())
                .await?;
            output(&study, flags.format)
        }
        IncludedCommands::Reconcile => {
            let report = ctx.service.reconcile_included_studies(project_id).await?;
            output(&report, flags.format)
        }
    }
}
