use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};
use which::which;

/// Configuration for launching or attaching to a browser session.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Explicit Chrome/Chromium binary; auto-detected when unset.
    pub executable: Option<PathBuf>,
    pub user_data_dir: PathBuf,
    pub headless: bool,
    /// DevTools endpoint (`ws://...` or `http://host:port`) of an
    /// operator-managed browser. When set the session attaches instead of
    /// launching.
    pub attach_endpoint: Option<String>,
    pub navigation_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub window_size: (u32, u32),
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            executable: None,
            user_data_dir: default_profile_dir(),
            headless: resolve_headless_default(),
            attach_endpoint: None,
            navigation_timeout_ms: 30_000,
            request_timeout_ms: 30_000,
            window_size: (1280, 900),
        }
    }
}

impl SessionConfig {
    pub fn resolved_executable(&self) -> Option<PathBuf> {
        match &self.executable {
            Some(path) if path.exists() => Some(path.clone()),
            _ => detect_chrome_executable(),
        }
    }
}

fn resolve_headless_default() -> bool {
    // Social sites are usually driven with a visible window so the operator
    // can log in; AUTOREPLY_HEADLESS=1 flips that.
    match env::var("AUTOREPLY_HEADLESS") {
        Ok(value) => matches!(
            value.to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

fn default_profile_dir() -> PathBuf {
    if let Ok(path) = env::var("AUTOREPLY_CHROME_PROFILE") {
        return PathBuf::from(path);
    }
    Path::new("./.autoreply-profile").into()
}

pub fn detect_chrome_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var("AUTOREPLY_CHROME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    for name in chrome_executable_names() {
        if let Ok(path) = which(name) {
            return Some(path);
        }
    }

    os_specific_chrome_paths()
        .into_iter()
        .find(|candidate| candidate.exists())
}

fn chrome_executable_names() -> &'static [&'static str] {
    #[cfg(target_os = "windows")]
    {
        &["chrome.exe", "chromium.exe", "msedge.exe"]
    }

    #[cfg(not(target_os = "windows"))]
    {
        &[
            "google-chrome-stable",
            "google-chrome",
            "chromium",
            "chromium-browser",
        ]
    }
}

fn os_specific_chrome_paths() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        for key in ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"] {
            if let Ok(value) = env::var(key) {
                let root = PathBuf::from(value.trim());
                paths.push(root.join("Google/Chrome/Application/chrome.exe"));
                paths.push(root.join("Chromium/Application/chrome.exe"));
            }
        }
        paths
    }

    #[cfg(target_os = "macos")]
    {
        vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ]
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        vec![
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/usr/bin/chromium"),
        ]
    }
}
