//! Contract tests for the Chromium surface. Ignored by default because they
//! need a Chrome/Chromium binary on the host.

use std::env;

use document_surface::{
    BrowserSession, ContextHandle, DocumentSurface, Predicate, Role, SessionConfig,
    SurfaceErrorKind, TextPattern,
};

fn contract_enabled() -> bool {
    env::var("AUTOREPLY_CHROMIUM_CONTRACT")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

const PAGE: &str = "data:text/html,<article><a href='https://example.test/ann'>Ann</a>\
<p>First!</p><div role='button'>Reply</div></article>\
<div role='button' onclick=\"this.remove()\">View more comments</div>";

#[tokio::test]
#[ignore = "requires Chrome/Chromium; set AUTOREPLY_CHROMIUM_CONTRACT=1"]
async fn contract_find_read_and_click() {
    if !contract_enabled() {
        eprintln!("skipping chromium contract test (AUTOREPLY_CHROMIUM_CONTRACT not enabled)");
        return;
    }

    let profile = tempfile::tempdir().expect("temporary chrome profile");
    let cfg = SessionConfig {
        headless: true,
        user_data_dir: profile.path().into(),
        ..Default::default()
    };
    let session = BrowserSession::open(&cfg).await.expect("launch browser");
    {
        let surface = session.surface().await.expect("primary surface");
        surface.navigate(PAGE).await.expect("navigate");

        let reply = Predicate::role(Role::Button).with_text(TextPattern::equals("reply"));
        let found = surface.find(&reply).await.expect("find reply");
        assert_eq!(found.len(), 1);

        let article = surface
            .ancestor(found[0], &Predicate::role(Role::Article), 4)
            .await
            .expect("ancestor")
            .expect("article container");
        let links = surface.links_within(article).await.expect("links");
        assert_eq!(links[0].text, "Ann");

        let more = Predicate::role(Role::Button).with_text(TextPattern::contains("view more"));
        let expander = surface.find(&more).await.expect("find expander")[0];
        surface.click(expander).await.expect("click expander");
        let err = surface.text_of(expander).await.unwrap_err();
        assert_eq!(err.kind, SurfaceErrorKind::Detached);

        let ctx = surface
            .open_scoped_context("about:blank")
            .await
            .expect("scoped context");
        surface.close_scoped_context(ctx).await.expect("close scoped");
        // Queries keep working before the caller switches back explicitly.
        assert_eq!(
            surface.active_context().await.expect("active"),
            ContextHandle::PRIMARY
        );
        assert_eq!(surface.find(&more).await.expect("find after close").len(), 0);
        surface
            .switch_context(ContextHandle::PRIMARY)
            .await
            .expect("switch back");
        assert_eq!(
            surface.active_context().await.expect("active"),
            ContextHandle::PRIMARY
        );
    }
    session.shutdown(false).await;
}
