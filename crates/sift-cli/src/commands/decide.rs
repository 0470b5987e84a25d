use anyhow::{Context, bail};
use sift_core::entities::AutomatedDecision;
use sift_core::enums::{Confidence, Decision};
use sift_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DecideArgs;
use crate::commands::shared::input::read_json;
use crate::commands::shared::parse::{parse_enum, parse_optional_enum};
use crate::commands::shared::project::require_project;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift decide`.
///
/// With `--file`, every verdict in the classifier response is applied in one
/// batch and unusable verdicts are reported as skipped.
pub async fn handle(args: &DecideArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let project_id = require_project(flags)?;

    if let Some(path) = &args.file {
        let value = read_json(path)?;
        SchemaRegistry::new()
            .validate_each("automated_decision", &value)
            .with_context(|| format!("{} does not hold valid verdicts", path.display()))?;
        let verdicts: Vec<AutomatedDecision> =
            serde_json::from_value(value).context("failed to decode verdicts")?;
        let report = ctx
            .service
            .record_automated_decisions(project_id, &verdicts)
            .await?;
        return output(&report, flags.format);
    }

    let (Some(candidate_id), Some(decision)) = (&args.candidate_id, &args.decision) else {
        bail!("pass <CANDIDATE_ID> <DECISION> or --file <PATH>");
    };
    let verdict = AutomatedDecision {
        candidate_id: candidate_id.clone(),
        decision: parse_enum::<Decision>(decision, "decision")?,
        justification: args.justification.clone().unwrap_or_default(),
        confidence: parse_optional_enum::<Confidence>(args.confidence.as_deref(), "confidence")?,
        subtopic: args.subtopic.clone(),
    };
    let candidate = ctx
        .service
        .record_automated_decision(project_id, &verdict)
        .await?;
    output(&candidate, flags.format)
}
