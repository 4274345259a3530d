//! Plain Graph API posting path: single comments, bulk posting from a file
//! and listing existing comments. No discovery involved.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph API error: {0}")]
    Api(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("cannot read {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            api_base: GRAPH_API_BASE.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphComment {
    pub id: String,
    #[serde(default)]
    pub from: Option<GraphAuthor>,
    #[serde(default)]
    pub message: String,
}

impl GraphComment {
    pub fn author(&self) -> &str {
        self.from
            .as_ref()
            .and_then(|from| from.name.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub total: usize,
    pub posted: usize,
    /// Error that stopped the batch early.
    pub stopped_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    data: Option<Vec<GraphComment>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

impl Envelope {
    fn into_result(self) -> Result<Self, GraphError> {
        match self.error {
            Some(err) => Err(GraphError::Api(
                err.message.unwrap_or_else(|| "Unknown error".to_string()),
            )),
            None => Ok(self),
        }
    }
}

pub struct GraphClient {
    client: Client,
    api_base: String,
    token: String,
}

impl GraphClient {
    pub fn new(token: impl Into<String>, settings: &GraphSettings) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn comments_url(&self, post_id: &str) -> String {
        format!("{}/{}/comments", self.api_base, post_id)
    }

    /// Post one comment and return its id.
    pub async fn post_comment(&self, post_id: &str, message: &str) -> Result<String, GraphError> {
        let envelope: Envelope = self
            .client
            .post(self.comments_url(post_id))
            .form(&[("access_token", self.token.as_str()), ("message", message)])
            .send()
            .await?
            .json()
            .await?;
        let id = envelope
            .into_result()?
            .id
            .ok_or_else(|| GraphError::InvalidResponse("comment id missing".into()))?;
        info!(target: "graph", %post_id, comment_id = %id, "comment posted");
        Ok(id)
    }

    pub async fn list_comments(
        &self,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<GraphComment>, GraphError> {
        let limit = limit.to_string();
        let envelope: Envelope = self
            .client
            .get(self.comments_url(post_id))
            .query(&[("access_token", self.token.as_str()), ("limit", limit.as_str())])
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope.into_result()?.data.unwrap_or_default())
    }

    /// Post every non-blank line of `path` as a comment, pausing `delay`
    /// between posts. Stops at the first failed post.
    pub async fn post_comments_from_file(
        &self,
        post_id: &str,
        path: &Path,
        delay: Duration,
        mut on_post: impl FnMut(usize, usize, &str),
    ) -> Result<BulkReport, GraphError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GraphError::File {
                path: path.display().to_string(),
                source,
            })?;
        let comments = comment_lines(&raw);
        let mut report = BulkReport {
            total: comments.len(),
            ..Default::default()
        };

        for (index, comment) in comments.iter().enumerate() {
            on_post(index + 1, report.total, comment);
            if let Err(err) = self.post_comment(post_id, comment).await {
                warn!(target: "graph", index = index + 1, %err, "stopping bulk post");
                report.stopped_by = Some(err.to_string());
                break;
            }
            report.posted += 1;
            if index + 1 < report.total && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(report)
    }
}

fn comment_lines(raw: &str) -> Vec<&str> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// First 50 characters of a comment, with an ellipsis when cut.
pub fn preview(comment: &str) -> String {
    let mut chars = comment.chars();
    let head: String = chars.by_ref().take(50).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
