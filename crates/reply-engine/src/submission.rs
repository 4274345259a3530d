use std::time::Duration;

use document_surface::{DocumentSurface, NodeHandle};
use tracing::{debug, info};

use crate::errors::SubmitError;
use crate::model::ClickPath;
use crate::policy::SubmissionPolicy;
use crate::tempo::settle;

/// Open the composer behind `node`, type `text`, submit, then hold off for
/// `pace` before handing control back.
pub async fn submit(
    surface: &dyn DocumentSurface,
    node: NodeHandle,
    text: &str,
    policy: &SubmissionPolicy,
    pace: Duration,
) -> Result<ClickPath, SubmitError> {
    if text.trim().is_empty() {
        return Err(SubmitError::EmptyText);
    }

    surface
        .scroll_into_view(node)
        .await
        .map_err(SubmitError::Scroll)?;
    settle(policy.scroll_settle()).await;

    let click = match surface.click(node).await {
        Ok(()) => ClickPath::Direct,
        Err(err) => {
            debug!(target: "submission", node = node.0, %err, "direct click failed; forcing");
            surface.force_click(node).await.map_err(SubmitError::Click)?;
            ClickPath::Forced
        }
    };
    settle(policy.focus_settle()).await;

    let input = surface
        .focused_input()
        .await
        .map_err(SubmitError::Focus)?
        .ok_or(SubmitError::NoFocusedInput)?;
    surface
        .type_text(input, text)
        .await
        .map_err(SubmitError::Type)?;
    surface.press_enter(input).await.map_err(SubmitError::Submit)?;
    info!(target: "submission", node = node.0, ?click, chars = text.chars().count(), "reply submitted");

    settle(pace).await;
    Ok(click)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::EnginePolicy;
    use document_surface::{Fault, FixtureDocument, NodeSpec, Predicate, Role, TextPattern};

    fn immediate() -> SubmissionPolicy {
        EnginePolicy::immediate().submission
    }

    async fn reply_node(doc: &FixtureDocument) -> NodeHandle {
        let predicate = Predicate::role(Role::Button).with_text(TextPattern::equals("Reply"));
        doc.find(&predicate).await.expect("find")[0]
    }

    #[tokio::test]
    async fn types_and_submits_through_focused_composer() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("button").text("Reply").composer()]);
        let node = reply_node(&doc).await;
        let path = submit(&doc, node, "hi", &immediate(), Duration::ZERO)
            .await
            .expect("submitted");
        assert_eq!(path, ClickPath::Direct);
        assert_eq!(doc.submissions()[0].text, "hi");
    }

    #[tokio::test]
    async fn intercepted_click_is_forced() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("button")
            .text("Reply")
            .composer()
            .fault(Fault::ClickIntercepted)]);
        let node = reply_node(&doc).await;
        let path = submit(&doc, node, "hi", &immediate(), Duration::ZERO)
            .await
            .expect("submitted");
        assert_eq!(path, ClickPath::Forced);
    }

    #[tokio::test]
    async fn missing_composer_is_reported() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("button")
            .text("Reply")
            .composer()
            .fault(Fault::NoComposer)]);
        let node = reply_node(&doc).await;
        let err = submit(&doc, node, "hi", &immediate(), Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::NoFocusedInput));
        assert!(doc.submissions().is_empty());
    }

    #[tokio::test]
    async fn blank_text_never_reaches_the_document() {
        let doc = FixtureDocument::from_nodes(vec![NodeSpec::new("button").text("Reply").composer()]);
        let node = reply_node(&doc).await;
        let err = submit(&doc, node, "  ", &immediate(), Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::EmptyText));
        assert!(doc.clicks().is_empty());
    }
}
