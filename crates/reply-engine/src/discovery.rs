//! Expands a lazily rendered comment thread until nothing more appears.

use document_surface::{DocumentSurface, Predicate, Role, SurfaceError};
use tracing::{debug, info, warn};

use crate::model::{DiscoveryReport, SortSwitch, StopReason};
use crate::policy::DiscoveryPolicy;
use crate::tempo::settle;

fn expansion_predicate(policy: &DiscoveryPolicy) -> Predicate {
    Predicate::role(Role::Button)
        .or_role(Role::Link)
        .with_texts(policy.expansion_patterns.iter().cloned())
        .max_len(policy.expansion_max_text_len)
}

/// Best-effort: render and expand every comment on the loaded post.
///
/// Always returns within `max_rounds` rounds. Surface failures only reduce
/// recall and are never propagated.
pub async fn discover(surface: &dyn DocumentSurface, policy: &DiscoveryPolicy) -> DiscoveryReport {
    if let Err(err) = surface.scroll_to_bottom().await {
        debug!(target: "discovery", %err, "initial scroll failed");
    }
    let sort = switch_to_all_comments(surface, policy).await;

    let predicate = expansion_predicate(policy);
    let mut rounds = 0;
    let mut clicked = 0;
    let mut empty_rounds = 0;

    let stop = loop {
        if rounds >= policy.max_rounds {
            break StopReason::Budget;
        }
        rounds += 1;

        if let Err(err) = surface.scroll_to_bottom().await {
            note_failure(rounds, "scroll failed", &err);
        }
        let found = match surface.find(&predicate).await {
            Ok(found) => found,
            Err(err) => {
                note_failure(rounds, "expansion query failed", &err);
                Vec::new()
            }
        };

        if found.is_empty() {
            empty_rounds += 1;
            if empty_rounds > policy.empty_round_threshold {
                break StopReason::Exhausted;
            }
            settle(policy.round_settle()).await;
            continue;
        }
        empty_rounds = 0;

        let mut round_clicks = 0;
        for node in &found {
            match surface.click(*node).await {
                Ok(()) => {
                    round_clicks += 1;
                    settle(policy.click_settle()).await;
                }
                Err(err) => note_failure(rounds, "expansion click failed", &err),
            }
        }
        debug!(
            target: "discovery",
            round = rounds,
            found = found.len(),
            clicked = round_clicks,
            "expansion round"
        );
        if round_clicks == 0 {
            warn!(target: "discovery", round = rounds, found = found.len(), "no expansion control was clickable");
            break StopReason::Stuck;
        }
        clicked += round_clicks;
        settle(policy.round_settle()).await;
    };

    info!(target: "discovery", rounds, clicked, ?sort, ?stop, "discovery finished");
    DiscoveryReport {
        rounds,
        clicked,
        sort,
        stop,
    }
}

/// Missing or stale controls are routine while the thread streams in; any
/// other surface failure is worth a warning.
fn note_failure(round: usize, what: &str, err: &SurfaceError) {
    if err.is_transient() {
        debug!(target: "discovery", round, %err, "{what}");
    } else {
        warn!(target: "discovery", round, kind = ?err.kind, %err, "{what}");
    }
}

/// Flip the comment filter from "most relevant" to "all comments".
async fn switch_to_all_comments(
    surface: &dyn DocumentSurface,
    policy: &DiscoveryPolicy,
) -> SortSwitch {
    let trigger = Predicate::role(Role::Button)
        .with_texts(policy.sort_trigger_patterns.iter().cloned())
        .max_len(policy.expansion_max_text_len);
    let Some(trigger) = surface.find(&trigger).await.ok().and_then(|nodes| nodes.into_iter().next())
    else {
        debug!(target: "discovery", "no sort filter control");
        return SortSwitch::NotPresent;
    };
    if let Err(err) = surface.click(trigger).await {
        debug!(target: "discovery", %err, "sort filter click failed");
        return SortSwitch::Failed;
    }
    settle(policy.sort_settle()).await;

    let option = Predicate::role(Role::MenuItem)
        .or_role(Role::Button)
        .with_texts(policy.sort_option_patterns.iter().cloned())
        .max_len(policy.expansion_max_text_len);
    let option = match surface.find(&option).await {
        Ok(nodes) => nodes.into_iter().next(),
        Err(err) => {
            debug!(target: "discovery", %err, "sort option query failed");
            None
        }
    };
    let Some(option) = option else {
        debug!(target: "discovery", "sort menu opened without an all-comments option");
        return SortSwitch::Failed;
    };
    match surface.click(option).await {
        Ok(()) => {
            settle(policy.sort_settle()).await;
            info!(target: "discovery", "switched comment filter to all comments");
            SortSwitch::Switched
        }
        Err(err) => {
            debug!(target: "discovery", %err, "sort option click failed");
            SortSwitch::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_surface::TextPattern;

    #[test]
    fn expansion_predicate_bounds_text_length() {
        let policy = DiscoveryPolicy::default();
        let predicate = expansion_predicate(&policy);
        assert!(predicate.matches_text("View more comments"));
        assert!(predicate.matches_text("View 12 replies"));
        assert!(predicate.matches_text("View all 3 replies"));
        assert!(!predicate.matches_text("Reply"));
        assert!(!predicate.matches_text(&format!("see more {}", "x".repeat(80))));
    }

    #[test]
    fn custom_patterns_replace_defaults() {
        let policy = DiscoveryPolicy {
            expansion_patterns: vec![TextPattern::equals("Load more")],
            ..Default::default()
        };
        assert!(expansion_predicate(&policy).matches_text("load more"));
        assert!(!expansion_predicate(&policy).matches_text("View more comments"));
    }
}
