#![allow(dead_code)]

use document_surface::{NodeSpec, Role};

pub const OPERATOR: &str = "Page Admin";

/// One comment as the post page renders it: author link, body, permalink
/// timestamp and a reply control that opens a composer.
pub fn comment(author: &str, slug: &str, body: &str) -> NodeSpec {
    NodeSpec::new("div").role(Role::Article).children([
        NodeSpec::new("a")
            .href(format!("https://www.facebook.com/{slug}?comment_id=77&__tn__=R"))
            .text(author),
        NodeSpec::new("div").attr("dir", "auto").text(body),
        NodeSpec::new("a")
            .href("https://www.facebook.com/groups/1/posts/2/?comment_id=77")
            .text("2h"),
        reply_button(),
    ])
}

pub fn reply_button() -> NodeSpec {
    NodeSpec::new("div").role(Role::Button).text("Reply").composer()
}

/// The operator's own answer nested under a comment.
pub fn operator_reply() -> NodeSpec {
    NodeSpec::new("div").role(Role::Article).children([
        NodeSpec::new("a")
            .href("https://www.facebook.com/pageadmin")
            .text(OPERATOR),
        NodeSpec::new("div").text("Thanks!"),
        reply_button(),
    ])
}

pub fn profile(intro: &str, post: &str) -> Vec<NodeSpec> {
    vec![
        NodeSpec::new("div").children([
            NodeSpec::new("h2").text("Intro"),
            NodeSpec::new("div").text(intro),
        ]),
        NodeSpec::new("div").attr("dir", "auto").text(post),
    ]
}
