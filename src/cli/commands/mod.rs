//! CLI command implementations.

pub mod auth;
pub mod get;
pub mod list;

use anyhow::Result;

use super::context::CliContext;
use super::types::Commands;

/// Run one parsed command against a ready context.
pub async fn dispatch(ctx: &CliContext, command: Commands, json_mode: bool) -> Result<()> {
    match command {
        Commands::Login(args) => auth::login(ctx, args, json_mode).await,
        Commands::Logout => auth::logout(ctx, json_mode).await,
        Commands::List(args) => list::execute(ctx, args, json_mode).await,
        Commands::Get { path } => get::execute(ctx, &path, json_mode).await,
    }
}
