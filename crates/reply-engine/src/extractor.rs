//! Recovers who wrote a comment from the markup around its reply control.

use std::panic::AssertUnwindSafe;

use document_surface::{ContextHandle, DocumentSurface, LinkInfo, NodeHandle, Predicate, Role};
use futures::FutureExt;
use tracing::{debug, warn};
use url::Url;

use crate::model::{AuthorContext, Extraction, ExtractionPath, SummaryStatus};
use crate::policy::ExtractionPolicy;
use crate::tempo::settle;

/// Author context for the comment owning `node`. Never fails: every stage
/// degrades to partial or default values.
///
/// With `lookup_profile` set, the author's profile is visited in a scoped
/// context to build a short summary; the primary context is active again
/// when this returns.
pub async fn extract(
    surface: &dyn DocumentSurface,
    node: NodeHandle,
    policy: &ExtractionPolicy,
    lookup_profile: bool,
) -> Extraction {
    let Some(author) = find_author_link(surface, node, policy).await else {
        return Extraction::fallback();
    };

    let name = author.text.trim().to_string();
    let profile_reference = author.href.as_deref().and_then(normalize_profile);
    let path = if profile_reference.is_some() {
        ExtractionPath::Full
    } else {
        ExtractionPath::NameOnly
    };

    let (profile_summary, summary) = match (&profile_reference, lookup_profile) {
        (Some(url), true) => summarize_profile(surface, url, policy).await,
        _ => (None, SummaryStatus::Skipped),
    };

    debug!(target: "extractor", author = %name, ?path, ?summary, "author extracted");
    Extraction {
        context: AuthorContext {
            name,
            profile_reference,
            profile_summary,
        },
        path,
        summary,
    }
}

async fn find_author_link(
    surface: &dyn DocumentSurface,
    node: NodeHandle,
    policy: &ExtractionPolicy,
) -> Option<LinkInfo> {
    let container = match surface
        .ancestor(node, &policy.container, policy.container_hops)
        .await
    {
        Ok(Some(container)) => container,
        Ok(None) => {
            debug!(target: "extractor", node = node.0, "no comment container within hop limit");
            return None;
        }
        Err(err) => {
            debug!(target: "extractor", node = node.0, %err, "container lookup failed");
            return None;
        }
    };
    let links = match surface.links_within(container).await {
        Ok(links) => links,
        Err(err) => {
            debug!(target: "extractor", node = node.0, %err, "link enumeration failed");
            return None;
        }
    };
    links.into_iter().find(|link| is_author_link(link, policy))
}

fn is_author_link(link: &LinkInfo, policy: &ExtractionPolicy) -> bool {
    let Some(href) = link.href.as_deref() else {
        return false;
    };
    let href = href.to_ascii_lowercase();
    link.text.trim().chars().count() > policy.min_author_len
        && !policy
            .excluded_link_fragments
            .iter()
            .any(|fragment| href.contains(&fragment.to_ascii_lowercase()))
}

/// Strip query and fragment from a profile link. `profile.php` links keep
/// their `id` parameter since it is the only thing naming the profile.
pub fn normalize_profile(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let Ok(mut url) = Url::parse(href) else {
        let bare = href.split(['?', '#']).next().unwrap_or_default();
        return (!bare.is_empty()).then(|| bare.to_string());
    };
    let id = url.path().ends_with("/profile.php").then(|| {
        url.query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned())
    });
    url.set_fragment(None);
    url.set_query(None);
    if let Some(Some(id)) = id {
        url.query_pairs_mut().append_pair("id", &id);
    }
    Some(url.to_string())
}

/// Visit the profile in a scoped context. The scoped context is closed and
/// the previous context restored on every path, including a panic inside
/// the scrape.
async fn summarize_profile(
    surface: &dyn DocumentSurface,
    url: &str,
    policy: &ExtractionPolicy,
) -> (Option<String>, SummaryStatus) {
    let primary = match surface.active_context().await {
        Ok(context) => context,
        Err(err) => {
            warn!(target: "extractor", %err, "cannot resolve active context; skipping profile");
            return (None, SummaryStatus::Failed);
        }
    };

    let scoped = match surface.open_scoped_context(url).await {
        Ok(context) => context,
        Err(err) => {
            warn!(target: "extractor", %url, %err, "failed to open profile");
            restore(surface, None, primary).await;
            return (None, SummaryStatus::Failed);
        }
    };

    let visit = tokio::time::timeout(policy.profile_timeout(), scrape_profile(surface, policy));
    let outcome = AssertUnwindSafe(visit).catch_unwind().await;
    restore(surface, Some(scoped), primary).await;

    match outcome {
        Ok(Ok(Some(summary))) => (Some(summary), SummaryStatus::Scraped),
        Ok(Ok(None)) => (None, SummaryStatus::Empty),
        Ok(Err(_)) => {
            warn!(target: "extractor", %url, "profile visit timed out");
            (None, SummaryStatus::TimedOut)
        }
        Err(_) => {
            warn!(target: "extractor", %url, "profile scrape panicked");
            (None, SummaryStatus::Failed)
        }
    }
}

async fn restore(surface: &dyn DocumentSurface, scoped: Option<ContextHandle>, primary: ContextHandle) {
    if let Some(scoped) = scoped {
        if let Err(err) = surface.close_scoped_context(scoped).await {
            warn!(target: "extractor", context = scoped.0, %err, "failed to close profile context");
        }
    }
    if let Err(err) = surface.switch_context(primary).await {
        warn!(target: "extractor", context = primary.0, %err, "failed to restore primary context");
    }
}

async fn scrape_profile(surface: &dyn DocumentSurface, policy: &ExtractionPolicy) -> Option<String> {
    settle(policy.profile_settle()).await;

    let mut parts = Vec::new();
    if let Some(intro) = scrape_intro(surface, policy).await {
        parts.push(format!("Intro: {intro}"));
    }
    let post_body = policy.post_body.clone().min_len(policy.min_post_len + 1);
    if let Ok(posts) = surface.find(&post_body).await {
        if let Some(post) = posts.first() {
            if let Ok(text) = surface.text_of(*post).await {
                parts.push(format!("Recent post: {}", text.trim()));
            }
        }
    }

    if parts.is_empty() {
        return None;
    }
    Some(truncate_chars(&parts.join("\n"), policy.summary_max_chars))
}

/// Text of the section headed by an intro label, minus the label itself.
async fn scrape_intro(surface: &dyn DocumentSurface, policy: &ExtractionPolicy) -> Option<String> {
    let heading = Predicate::role(Role::Heading)
        .with_texts(policy.intro_labels.iter().cloned());
    let heading = surface.find(&heading).await.ok()?.into_iter().next()?;
    let label = surface.text_of(heading).await.ok()?;

    let mut cursor = heading;
    for _ in 0..3 {
        cursor = surface.parent(cursor).await.ok()??;
        let text = surface.text_of(cursor).await.ok()?;
        let body = text
            .trim()
            .strip_prefix(label.trim())
            .unwrap_or(text.trim())
            .trim();
        if !body.is_empty() {
            return Some(body.to_string());
        }
    }
    None
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}
