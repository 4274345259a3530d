use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::handler::Handler;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chromium::ChromiumSurface;
use crate::config::SessionConfig;
use crate::error::{SurfaceError, SurfaceErrorKind, SurfaceResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionMode {
    /// Browser process launched and owned by this session.
    Launched,
    /// Operator-managed browser; left running when the session ends.
    Attached,
}

/// One browser-automation connection spanning a whole run.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    mode: SessionMode,
    navigation_timeout: Duration,
}

impl BrowserSession {
    /// Attach when an endpoint is configured, launch otherwise.
    pub async fn open(cfg: &SessionConfig) -> SurfaceResult<Self> {
        match &cfg.attach_endpoint {
            Some(endpoint) => Self::attach(endpoint, cfg).await,
            None => Self::launch(cfg).await,
        }
    }

    pub async fn launch(cfg: &SessionConfig) -> SurfaceResult<Self> {
        let browser_config = browser_config(cfg)?;
        info!(
            target: "chromium",
            headless = cfg.headless,
            profile = %cfg.user_data_dir.display(),
            "launching chromium"
        );
        let (browser, handler) = Browser::launch(browser_config)
            .await
            .map_err(|err| SurfaceError::io(format!("failed to launch browser: {err}")))?;
        Ok(Self::spawn(browser, handler, SessionMode::Launched, cfg))
    }

    pub async fn attach(endpoint: &str, cfg: &SessionConfig) -> SurfaceResult<Self> {
        info!(target: "chromium", %endpoint, "attaching to running browser");
        let (browser, handler) = Browser::connect(endpoint.to_string())
            .await
            .map_err(|err| SurfaceError::io(format!("failed to attach to {endpoint}: {err}")))?;
        Ok(Self::spawn(browser, handler, SessionMode::Attached, cfg))
    }

    fn spawn(
        browser: Browser,
        mut handler: Handler,
        mode: SessionMode,
        cfg: &SessionConfig,
    ) -> Self {
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    debug!(target: "chromium", ?err, "handler event error");
                }
            }
        });
        Self {
            browser,
            handler,
            mode,
            navigation_timeout: Duration::from_millis(cfg.navigation_timeout_ms),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Surface over the first existing tab, or a fresh blank tab when the
    /// browser has none.
    pub async fn surface(&self) -> SurfaceResult<ChromiumSurface<'_>> {
        let primary = self.primary_page().await?;
        Ok(ChromiumSurface::new(
            &self.browser,
            primary,
            self.navigation_timeout,
        ))
    }

    async fn primary_page(&self) -> SurfaceResult<Page> {
        let pages = self
            .browser
            .pages()
            .await
            .map_err(|err| SurfaceError::io(format!("failed to list tabs: {err}")))?;
        match pages.into_iter().next() {
            Some(page) => Ok(page),
            None => self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|err| SurfaceError::io(format!("failed to open tab: {err}"))),
        }
    }

    /// Close a launched browser; detach from an attached one.
    pub async fn shutdown(mut self, keep_open: bool) {
        if self.mode == SessionMode::Launched && !keep_open {
            if let Err(err) = self.browser.close().await {
                warn!(target: "chromium", ?err, "browser close returned error");
            }
            if let Err(err) = self.browser.wait().await {
                warn!(target: "chromium", ?err, "browser process wait failed");
            }
        } else {
            info!(target: "chromium", mode = ?self.mode, "leaving browser open");
        }
        self.handler.abort();
    }
}

fn browser_config(cfg: &SessionConfig) -> SurfaceResult<BrowserConfig> {
    let profile_dir = if cfg.user_data_dir.is_absolute() {
        cfg.user_data_dir.clone()
    } else {
        std::env::current_dir()
            .map_err(|err| SurfaceError::internal(format!("failed to resolve cwd: {err}")))?
            .join(&cfg.user_data_dir)
    };
    std::fs::create_dir_all(&profile_dir)
        .map_err(|err| SurfaceError::internal(format!("failed to ensure user-data-dir: {err}")))?;

    let mut builder = BrowserConfig::builder()
        .request_timeout(Duration::from_millis(cfg.request_timeout_ms))
        .launch_timeout(Duration::from_secs(20))
        .window_size(cfg.window_size.0, cfg.window_size.1)
        .user_data_dir(profile_dir);

    if !cfg.headless {
        builder = builder.with_head();
    }
    if std::env::var("AUTOREPLY_DISABLE_SANDBOX")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
    {
        builder = builder.no_sandbox();
    }
    builder = builder.args(vec![
        "--disable-background-timer-throttling",
        "--disable-notifications",
        "--disable-popup-blocking",
        "--no-first-run",
        "--no-default-browser-check",
        "--password-store=basic",
    ]);
    if let Some(executable) = cfg.resolved_executable() {
        builder = builder.chrome_executable(executable);
    }

    builder.build().map_err(|err| {
        SurfaceError::new(SurfaceErrorKind::Internal).with_hint(format!("browser config error: {err}"))
    })
}
