use anyhow::Result;

use super::commands::Commands;
use super::context::CliContext;
use super::env::CliArgs;
use super::graph::{cmd_bulk, cmd_comment, cmd_list};
use super::rehearse::cmd_rehearse;
use super::reply::cmd_reply;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Reply(args) => cmd_reply(args, ctx).await,
        Commands::Rehearse(args) => cmd_rehearse(args, ctx).await,
        Commands::Comment(args) => cmd_comment(args, ctx).await,
        Commands::Bulk(args) => cmd_bulk(args, ctx).await,
        Commands::List(args) => cmd_list(args, ctx).await,
    }
}
