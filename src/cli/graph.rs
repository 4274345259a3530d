use std::time::Duration;

use anyhow::{bail, Result};
use serde::Serialize;

use super::commands::{BulkArgs, CommentArgs, ListArgs};
use super::context::CliContext;
use super::output::emit;
use crate::graph::{preview, GraphClient};

#[derive(Serialize)]
struct Posted {
    post_id: String,
    comment_id: String,
}

fn client(ctx: &CliContext) -> Result<GraphClient> {
    Ok(GraphClient::new(ctx.access_token()?, &ctx.settings().graph)?)
}

pub async fn cmd_comment(args: CommentArgs, ctx: &CliContext) -> Result<()> {
    let client = client(ctx)?;
    let post_id = ctx.post_id(args.post_id)?;
    let comment_id = client.post_comment(&post_id, &args.message).await?;
    if ctx.output().is_human() {
        println!("Comment posted. ID: {comment_id}");
    }
    emit(
        ctx.output(),
        &Posted {
            post_id,
            comment_id,
        },
    )
}

pub async fn cmd_bulk(args: BulkArgs, ctx: &CliContext) -> Result<()> {
    let client = client(ctx)?;
    let post_id = ctx.post_id(args.post_id)?;
    let human = ctx.output().is_human();
    let report = client
        .post_comments_from_file(
            &post_id,
            &args.file,
            Duration::from_secs(args.delay),
            |index, total, comment| {
                if human {
                    println!("[{index}/{total}] {}", preview(comment));
                }
            },
        )
        .await?;

    if human {
        println!("Posted {}/{} comment(s).", report.posted, report.total);
    }
    emit(ctx.output(), &report)?;
    if let Some(reason) = report.stopped_by {
        bail!("Bulk posting stopped early: {reason}");
    }
    Ok(())
}

pub async fn cmd_list(args: ListArgs, ctx: &CliContext) -> Result<()> {
    let client = client(ctx)?;
    let post_id = ctx.post_id(args.post_id)?;
    let comments = client.list_comments(&post_id, args.limit).await?;
    if ctx.output().is_human() {
        println!("Found {} comment(s):", comments.len());
        for comment in &comments {
            println!("  - {}: {}", comment.author(), preview(&comment.message));
        }
    }
    emit(ctx.output(), &comments)
}
