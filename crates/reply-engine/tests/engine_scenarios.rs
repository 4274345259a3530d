mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{comment, operator_reply, profile, OPERATOR};
use document_surface::{
    ContextHandle, Fault, FixtureDocument, FixtureSpec, NodeSpec, Role,
};
use parking_lot::Mutex;
use reply_engine::{
    ClickPath, CommentOutcome, DiscoveryReport, DraftSource, EngineError, EnginePolicy,
    ProgressPort, ReplyEngine, RunRequest, RunResult, SortSwitch, SAFETY_REPLY,
};
use reply_llm::{CompletionRequest, GenerationError, ScriptedGenerator, TextGenerator};

fn engine() -> ReplyEngine {
    ReplyEngine::builder(EnginePolicy::immediate()).build()
}

fn texts(doc: &FixtureDocument) -> Vec<String> {
    doc.submissions().into_iter().map(|s| s.text).collect()
}

#[tokio::test]
async fn default_text_reaches_every_comment() {
    let doc = FixtureDocument::from_nodes(vec![
        comment("Ann Lee", "ann.lee", "Love this!"),
        comment("Bob Stone", "bob.stone", "Where was this taken?"),
    ]);
    let request = RunRequest::new(OPERATOR)
        .default_text("hi")
        .delay(Duration::ZERO);

    let report = engine().run(&doc, &request).await.expect("run");

    assert_eq!(
        report.result,
        RunResult {
            attempted: 2,
            succeeded: 2,
            skipped: 0
        }
    );
    assert_eq!(texts(&doc), vec!["hi", "hi"]);
    assert!(report.outcomes.iter().all(|outcome| matches!(
        outcome,
        CommentOutcome::Replied {
            draft: DraftSource::FallbackFixed,
            click: ClickPath::Direct,
            ..
        }
    )));
}

#[tokio::test]
async fn failing_generator_without_default_uses_safety_reply() {
    let doc = FixtureDocument::from_nodes(vec![comment("Ann Lee", "ann.lee", "Love this!")]);
    let generator = Arc::new(ScriptedGenerator::new());
    generator.push_err(GenerationError::Status {
        status: 500,
        body: "down".into(),
    });
    let engine = ReplyEngine::builder(EnginePolicy::immediate())
        .with_generator(generator)
        .build();

    let report = engine
        .run(&doc, &RunRequest::new(OPERATOR).default_text(""))
        .await
        .expect("run");

    assert_eq!(report.result.succeeded, 1);
    assert_eq!(texts(&doc), vec![SAFETY_REPLY]);
}

#[tokio::test]
async fn one_failed_submission_does_not_stop_the_batch() {
    let mut broken = comment("Bob Stone", "bob.stone", "Second");
    let reply = broken.children.last_mut().expect("reply control");
    reply.fault = Some(Fault::SubmitFails);
    let doc = FixtureDocument::from_nodes(vec![
        comment("Ann Lee", "ann.lee", "First"),
        broken,
        comment("Cy Park", "cy.park", "Third"),
    ]);

    let report = engine()
        .run(&doc, &RunRequest::new(OPERATOR).default_text("hi"))
        .await
        .expect("run");

    assert_eq!(report.result.attempted, 3);
    assert_eq!(report.result.succeeded, 2);
    assert!(matches!(
        &report.outcomes[1],
        CommentOutcome::Failed { author: Some(author), .. } if author == "Bob Stone"
    ));
    assert!(matches!(report.outcomes[2], CommentOutcome::Replied { .. }));
    assert_eq!(doc.submissions().len(), 2);
}

#[tokio::test]
async fn threads_with_an_operator_reply_are_skipped() {
    let answered = comment("Ann Lee", "ann.lee", "First").child(operator_reply());
    let doc = FixtureDocument::from_nodes(vec![
        answered,
        comment("Bob Stone", "bob.stone", "Second"),
    ]);

    let report = engine()
        .run(&doc, &RunRequest::new(OPERATOR).default_text("hi"))
        .await
        .expect("run");

    // Ann's thread and the operator's own reply are both skipped.
    assert_eq!(
        report.result,
        RunResult {
            attempted: 3,
            succeeded: 1,
            skipped: 2
        }
    );
    assert_eq!(report.result.failed(), 0);
    assert_eq!(doc.submissions().len(), 1);
}

#[tokio::test]
async fn discovery_expands_the_thread_before_enumerating() {
    let doc = FixtureDocument::from_nodes(vec![
        NodeSpec::new("div")
            .role(Role::Button)
            .text("Most relevant")
            .reveals([NodeSpec::new("div")
                .role(Role::MenuItem)
                .text("All comments")
                .reveals([comment("Hidden Hal", "hal", "Only under all comments")])]),
        comment("Ann Lee", "ann.lee", "First"),
        NodeSpec::new("div")
            .role(Role::Button)
            .text("View more comments")
            .lazy()
            .reveals([
                comment("Bob Stone", "bob.stone", "Second"),
                NodeSpec::new("div")
                    .role(Role::Button)
                    .text("View 2 replies")
                    .reveals([comment("Cy Park", "cy.park", "Reply one")]),
            ]),
    ]);

    let report = engine()
        .run(&doc, &RunRequest::new(OPERATOR).default_text("hi"))
        .await
        .expect("run");

    assert_eq!(report.discovery.sort, SortSwitch::Switched);
    assert_eq!(report.discovery.clicked, 2);
    assert_eq!(report.result.attempted, 4);
    assert_eq!(report.result.succeeded, 4);
}

#[tokio::test]
async fn navigation_failure_aborts_the_run() {
    let doc = FixtureDocument::new(FixtureSpec {
        nodes: vec![comment("Ann Lee", "ann.lee", "First")],
        navigation_fails: true,
        ..Default::default()
    });
    let request = RunRequest::new(OPERATOR).post_url("https://www.facebook.com/posts/1");

    let err = engine().run(&doc, &request).await.unwrap_err();

    assert!(matches!(err, EngineError::Navigation { .. }));
    assert!(doc.submissions().is_empty());
    assert_eq!(doc.navigations(), vec!["https://www.facebook.com/posts/1"]);
}

struct PanicsOnSecondCall {
    calls: Mutex<usize>,
}

#[async_trait]
impl TextGenerator for PanicsOnSecondCall {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, GenerationError> {
        let call = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls
        };
        if call == 2 {
            panic!("generator blew up");
        }
        Ok("Thank you!".to_string())
    }
}

#[tokio::test]
async fn a_panicking_comment_is_isolated() {
    let doc = FixtureDocument::from_nodes(vec![
        comment("Ann Lee", "ann.lee", "First"),
        comment("Bob Stone", "bob.stone", "Second"),
        comment("Cy Park", "cy.park", "Third"),
    ]);
    let engine = ReplyEngine::builder(EnginePolicy::immediate())
        .with_generator(Arc::new(PanicsOnSecondCall {
            calls: Mutex::new(0),
        }))
        .build();

    let report = engine
        .run(&doc, &RunRequest::new(OPERATOR))
        .await
        .expect("run");

    assert_eq!(report.result.attempted, 3);
    assert_eq!(report.result.succeeded, 2);
    assert!(matches!(
        &report.outcomes[1],
        CommentOutcome::Failed { reason, .. } if reason.contains("generator blew up")
    ));
    assert_eq!(texts(&doc), vec!["Thank you!", "Thank you!"]);
}

#[tokio::test]
async fn profile_summary_feeds_the_prompt_and_primary_stays_active() {
    let mut profiles = HashMap::new();
    profiles.insert(
        "https://www.facebook.com/ann.lee".to_string(),
        profile(
            "Home cook and gardener",
            "Spent the whole weekend repotting tomatoes and it was absolutely worth it.",
        ),
    );
    let doc = FixtureDocument::new(FixtureSpec {
        nodes: vec![comment("Ann Lee", "ann.lee", "Love this!")],
        profiles,
        ..Default::default()
    });
    let generator = Arc::new(ScriptedGenerator::answering(["\"Thanks Ann!\""]));
    let engine = ReplyEngine::builder(EnginePolicy::immediate())
        .with_generator(generator.clone())
        .build();

    let report = engine
        .run(&doc, &RunRequest::new(OPERATOR))
        .await
        .expect("run");

    assert_eq!(report.result.succeeded, 1);
    assert_eq!(texts(&doc), vec!["Thanks Ann!"]);
    let prompt = &generator.requests()[0].user_prompt;
    assert!(prompt.contains("Ann Lee"));
    assert!(prompt.contains("Home cook and gardener"));
    assert!(prompt.contains("repotting tomatoes"));
    assert_eq!(doc.current_context(), ContextHandle::PRIMARY);
    assert_eq!(doc.open_contexts(), vec![ContextHandle::PRIMARY]);
}

#[derive(Default)]
struct Recorder {
    discovered: Mutex<Option<usize>>,
    comments: Mutex<Vec<(usize, usize)>>,
    finished: Mutex<Option<RunResult>>,
}

impl ProgressPort for Recorder {
    fn on_discovered(&self, _report: &DiscoveryReport, comments: usize) {
        *self.discovered.lock() = Some(comments);
    }

    fn on_comment(&self, index: usize, total: usize, _outcome: &CommentOutcome) {
        self.comments.lock().push((index, total));
    }

    fn on_finished(&self, result: &RunResult) {
        *self.finished.lock() = Some(*result);
    }
}

#[tokio::test]
async fn progress_is_reported_per_comment() {
    let doc = FixtureDocument::from_nodes(vec![
        comment("Ann Lee", "ann.lee", "First"),
        comment("Bob Stone", "bob.stone", "Second"),
    ]);
    let recorder = Arc::new(Recorder::default());
    let engine = ReplyEngine::builder(EnginePolicy::immediate())
        .with_progress(recorder.clone())
        .build();

    let report = engine
        .run(&doc, &RunRequest::new(OPERATOR).default_text("hi"))
        .await
        .expect("run");

    assert_eq!(*recorder.discovered.lock(), Some(2));
    assert_eq!(*recorder.comments.lock(), vec![(1, 2), (2, 2)]);
    assert_eq!(*recorder.finished.lock(), Some(report.result));
}

#[tokio::test]
async fn screenshot_is_taken_after_discovery() {
    let dir = tempfile::tempdir().expect("temp dir");
    let doc = FixtureDocument::from_nodes(vec![comment("Ann Lee", "ann.lee", "First")]);
    let request = RunRequest::new(OPERATOR)
        .default_text("hi")
        .screenshot_dir(dir.path().join("shots"));

    let report = engine().run(&doc, &request).await.expect("run");

    let shot = report.screenshot.expect("screenshot path");
    assert!(shot.starts_with(dir.path().join("shots")));
    assert_eq!(doc.screenshots(), vec![shot]);
}

#[tokio::test]
async fn runs_are_repeatable_across_posts() {
    let doc = FixtureDocument::from_nodes(vec![comment("Ann Lee", "ann.lee", "First")]);
    let engine = engine();
    let first = engine
        .run(&doc, &RunRequest::new(OPERATOR).post_url("https://example.test/1").default_text("hi"))
        .await
        .expect("first run");
    let second = engine
        .run(&doc, &RunRequest::new(OPERATOR).post_url("https://example.test/2").default_text("hi"))
        .await
        .expect("second run");
    assert_eq!(first.result.succeeded, 1);
    // Posted replies are not rendered back into the fixture, so the thread
    // still reads as unanswered.
    assert_eq!(second.result.attempted, 1);
    assert_eq!(doc.navigations().len(), 2);
}
