use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Project { action } => commands::project::handle(&action, ctx, flags).await,
        Commands::Ingest(args) => commands::ingest::handle(&args, ctx, flags).await,
        Commands::Candidate { action } => commands::candidate::handle(&action, ctx, flags).await,
        Commands::Decide(args) => commands::decide::handle(&args, ctx, flags).await,
        Commands::Confirm(args) => commands::confirm::handle(&args, ctx, flags).await,
        Commands::Included { action } => commands::included::handle(&action, ctx, flags).await,
        Commands::Stats => commands::stats::handle(ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Schema(args) => commands::schema::handle(&args, flags),
    }
}
