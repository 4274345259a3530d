use document_surface::{DocumentSurface, LinkInfo, NodeHandle, SurfaceError};
use tracing::{debug, warn};

use crate::model::DedupVerdict;
use crate::policy::DedupPolicy;

/// Has the operator already posted in the thread owning `node`?
///
/// A link whose text contains the operator name, and is at most
/// `name_slack` characters longer than it, counts as a prior reply.
/// Inspection failures yield [`DedupVerdict::Undetermined`].
pub async fn check(
    surface: &dyn DocumentSurface,
    node: NodeHandle,
    operator_name: &str,
    policy: &DedupPolicy,
) -> DedupVerdict {
    let operator_name = operator_name.trim();
    if operator_name.is_empty() {
        return DedupVerdict::NotReplied;
    }

    let container = match surface
        .ancestor(node, &policy.container, policy.container_hops)
        .await
    {
        Ok(Some(container)) => container,
        Ok(None) => {
            debug!(target: "dedup", node = node.0, "no thread container within hop limit");
            return DedupVerdict::Undetermined;
        }
        Err(err) => {
            note_failure(node, "thread container lookup failed", &err);
            return DedupVerdict::Undetermined;
        }
    };
    let links = match surface.links_within(container).await {
        Ok(links) => links,
        Err(err) => {
            note_failure(node, "thread link enumeration failed", &err);
            return DedupVerdict::Undetermined;
        }
    };

    if links
        .iter()
        .any(|link| names_operator(link, operator_name, policy.name_slack))
    {
        DedupVerdict::Replied
    } else {
        DedupVerdict::NotReplied
    }
}

fn note_failure(node: NodeHandle, what: &str, err: &SurfaceError) {
    if err.is_transient() {
        debug!(target: "dedup", node = node.0, %err, "{what}");
    } else {
        warn!(target: "dedup", node = node.0, kind = ?err.kind, %err, "{what}");
    }
}

fn names_operator(link: &LinkInfo, operator_name: &str, slack: usize) -> bool {
    let text = link.text.trim().to_lowercase();
    text.chars().count() <= operator_name.chars().count() + slack
        && text.contains(&operator_name.to_lowercase())
}
