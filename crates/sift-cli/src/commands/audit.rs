use sift_core::enums::{AuditAction, EntityType};
use sift_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::parse::parse_optional_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift audit`.
///
/// Scoped to `--project` when one is given; otherwise covers every project.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        project_id: flags.project.clone(),
        entity_type: parse_optional_enum::<EntityType>(args.entity_type.as_deref(), "entity type")?,
        entity_id: args.entity_id.clone(),
        action: parse_optional_enum::<AuditAction>(args.action.as_deref(), "action")?,
        limit: Some(ctx.limit(None, flags.limit)),
    };
    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}
