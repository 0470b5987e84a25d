use anyhow::bail;
use sift_db::updates::project::ProjectUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProjectCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `sift project`.
pub async fn handle(
    action: &ProjectCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProjectCommands::Create { name, description } => {
            let project = ctx
                .service
                .create_project(name, description.as_deref())
                .await?;
            output(&project, flags.format)
        }
        ProjectCommands::List { limit } => {
            let projects = ctx
                .service
                .list_projects(ctx.limit(*limit, flags.limit))
                .await?;
            output(&projects, flags.format)
        }
        ProjectCommands::Show { id } => {
            let project = ctx.service.get_project(id).await?;
            output(&project, flags.format)
        }
        ProjectCommands::Update {
            id,
            name,
            description,
            completed_tasks,
            total_tasks,
        } => {
            if name.is_none()
                && description.is_none()
                && completed_tasks.is_none()
                && total_tasks.is_none()
            {
                bail!("nothing to update: pass --name, --description, --completed-tasks, or --total-tasks");
            }

            let mut builder = ProjectUpdateBuilder::new();
            if let Some(name) = name {
                builder = builder.name(name.as_str());
            }
            if let Some(description) = description {
                // An empty string clears the description.
                let value = Some(description.trim())
                    .filter(|d| !d.is_empty())
                    .map(String::from);
                builder = builder.description(value);
            }
            if let Some(completed) = completed_tasks {
                builder = builder.completed_tasks(*completed);
            }
            if let Some(total) = total_tasks {
                builder = builder.total_tasks(*total);
            }

            let project = ctx.service.update_project(id, builder.build()).await?;
            output(&project, flags.format)
        }
        ProjectCommands::Delete { id } => {
            ctx.service.delete_project(id).await?;
            output(
                &serde_json::json!({ "deleted": id }),
                flags.format,
            )
        }
    }
}
