use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Discover comments on one or more posts in a browser and reply to them
    Reply(ReplyArgs),

    /// Run the reply engine against a recorded fixture instead of a browser
    Rehearse(RehearseArgs),

    /// Post a single comment through the Graph API
    Comment(CommentArgs),

    /// Post one comment per line of a file through the Graph API
    Bulk(BulkArgs),

    /// List existing comments on a post through the Graph API
    List(ListArgs),
}

#[derive(Args, Clone)]
pub struct ReplyArgs {
    /// Post URL; repeat for several posts. Omit to use the page already open
    #[arg(short, long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Reply used when no generated text is available
    #[arg(short = 't', long)]
    pub default_text: Option<String>,

    /// Seconds to wait after each reply
    #[arg(long)]
    pub delay: Option<u64>,

    /// Your display name, used to skip threads you already answered
    #[arg(short, long)]
    pub name: Option<String>,

    /// DevTools endpoint of a running browser to attach to
    #[arg(long, value_name = "ENDPOINT")]
    pub attach: Option<String>,

    /// Leave the browser open when done
    #[arg(long)]
    pub keep_open: bool,

    /// Launch the browser without a window
    #[arg(long)]
    pub headless: bool,
}

#[derive(Args, Clone)]
pub struct RehearseArgs {
    /// Fixture document (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub fixture: PathBuf,

    #[arg(short = 't', long)]
    pub default_text: Option<String>,

    #[arg(short, long)]
    pub name: Option<String>,

    /// Ask the configured generator for replies
    #[arg(long)]
    pub generate: bool,
}

#[derive(Args, Clone)]
pub struct CommentArgs {
    /// Post id ({page_id}_{post_id}); defaults to FB_POST_ID
    #[arg(short, long)]
    pub post_id: Option<String>,

    /// Comment text
    #[arg(short, long)]
    pub message: String,
}

#[derive(Args, Clone)]
pub struct BulkArgs {
    #[arg(short, long)]
    pub post_id: Option<String>,

    /// File with one comment per line
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    /// Seconds to wait between comments
    #[arg(long, default_value_t = 5)]
    pub delay: u64,
}

#[derive(Args, Clone)]
pub struct ListArgs {
    #[arg(short, long)]
    pub post_id: Option<String>,

    /// Max comments to list
    #[arg(long, default_value_t = 25)]
    pub limit: u32,
}
