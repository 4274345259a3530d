use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use document_surface::{DocumentSurface, NodeHandle};
use futures::FutureExt;
use reply_llm::TextGenerator;
use tracing::{info, instrument, warn};

use crate::errors::EngineError;
use crate::model::{CommentOutcome, RunReport, RunRequest, RunResult};
use crate::policy::EnginePolicy;
use crate::ports::{NullProgress, ProgressPort};
use crate::tempo::settle;
use crate::{composer, dedup, discovery, extractor, submission};

pub struct ReplyEngineBuilder {
    policy: EnginePolicy,
    generator: Option<Arc<dyn TextGenerator>>,
    progress: Option<Arc<dyn ProgressPort>>,
}

impl ReplyEngineBuilder {
    pub fn new(policy: EnginePolicy) -> Self {
        Self {
            policy,
            generator: None,
            progress: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressPort>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn build(self) -> ReplyEngine {
        ReplyEngine {
            policy: self.policy,
            generator: self.generator,
            progress: self.progress.unwrap_or_else(|| Arc::new(NullProgress)),
        }
    }
}

/// Sequences discovery, extraction, dedup, composition and submission over
/// every comment of one post. Reusable across posts of a session.
pub struct ReplyEngine {
    policy: EnginePolicy,
    generator: Option<Arc<dyn TextGenerator>>,
    progress: Arc<dyn ProgressPort>,
}

impl ReplyEngine {
    pub fn builder(policy: EnginePolicy) -> ReplyEngineBuilder {
        ReplyEngineBuilder::new(policy)
    }

    pub fn policy(&self) -> &EnginePolicy {
        &self.policy
    }

    /// Run one post. Only navigation and comment enumeration can fail the
    /// run; every per-comment problem, panics included, ends up as a
    /// [`CommentOutcome::Failed`] entry.
    #[instrument(skip_all, fields(post = request.post_url.as_deref().unwrap_or("<current>")))]
    pub async fn run(
        &self,
        surface: &dyn DocumentSurface,
        request: &RunRequest,
    ) -> Result<RunReport, EngineError> {
        if let Some(url) = &request.post_url {
            info!(target: "engine", %url, "loading post");
            surface
                .navigate(url)
                .await
                .map_err(|source| EngineError::Navigation {
                    url: url.clone(),
                    source,
                })?;
            settle(self.policy.page_settle()).await;
        }

        let discovery = discovery::discover(surface, &self.policy.discovery).await;
        let screenshot = match &request.screenshot_dir {
            Some(dir) => capture(surface, dir).await,
            None => None,
        };

        let comments = surface
            .find(&self.policy.reply_affordance)
            .await
            .map_err(EngineError::Enumerate)?;
        let total = comments.len();
        info!(target: "engine", comments = total, "reply affordances found");
        self.progress.on_discovered(&discovery, total);

        let mut result = RunResult::default();
        let mut outcomes = Vec::with_capacity(total);
        for (index, node) in comments.into_iter().enumerate() {
            let outcome = AssertUnwindSafe(self.process(surface, node, request))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| CommentOutcome::Failed {
                    author: None,
                    reason: format!("panicked: {}", panic_message(payload.as_ref())),
                });
            if let CommentOutcome::Failed { author, reason } = &outcome {
                warn!(target: "engine", index = index + 1, author = ?author, %reason, "comment failed");
            }
            result.record(&outcome);
            self.progress.on_comment(index + 1, total, &outcome);
            outcomes.push(outcome);
        }

        info!(
            target: "engine",
            attempted = result.attempted,
            succeeded = result.succeeded,
            skipped = result.skipped,
            "run finished"
        );
        self.progress.on_finished(&result);
        Ok(RunReport {
            result,
            discovery,
            outcomes,
            screenshot,
        })
    }

    async fn process(
        &self,
        surface: &dyn DocumentSurface,
        node: NodeHandle,
        request: &RunRequest,
    ) -> CommentOutcome {
        let extraction = extractor::extract(
            surface,
            node,
            &self.policy.extraction,
            self.generator.is_some(),
        )
        .await;
        let author = extraction.context.name.clone();

        let verdict = dedup::check(surface, node, &request.operator_name, &self.policy.dedup).await;
        if verdict.is_replied() {
            info!(target: "engine", %author, "already replied; skipping");
            return CommentOutcome::SkippedDuplicate { author };
        }

        let draft = composer::compose(
            self.generator.as_deref(),
            &extraction,
            request.default_text.as_deref(),
            &self.policy.composer,
        )
        .await;

        match submission::submit(
            surface,
            node,
            &draft.text,
            &self.policy.submission,
            request.delay,
        )
        .await
        {
            Ok(click) => CommentOutcome::Replied {
                author,
                extraction: extraction.path,
                draft: draft.source,
                click,
            },
            Err(err) => CommentOutcome::Failed {
                author: Some(author),
                reason: err.to_string(),
            },
        }
    }
}

/// Post-discovery screenshot. Purely diagnostic.
async fn capture(surface: &dyn DocumentSurface, dir: &Path) -> Option<PathBuf> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        warn!(target: "engine", dir = %dir.display(), %err, "cannot create screenshot dir");
        return None;
    }
    let path = dir.join(format!(
        "after-discovery-{}.png",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ));
    match surface.screenshot(&path).await {
        Ok(()) => {
            info!(target: "engine", path = %path.display(), "screenshot saved");
            Some(path)
        }
        Err(err) => {
            warn!(target: "engine", %err, "screenshot failed");
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
