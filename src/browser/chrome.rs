//! Chrome discovery and launch plumbing.

use crate::config::schema::BrowserSettings;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU16, Ordering};

static DEBUG_PORT_COUNTER: AtomicU16 = AtomicU16::new(9222);

/// Allocate the next remote-debugging port.
/// Starts at 9222 and increments; wraps around at 65500.
pub fn allocate_debug_port() -> u16 {
    let port = DEBUG_PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    if port > 65500 {
        DEBUG_PORT_COUNTER.store(9222, Ordering::SeqCst);
        return 9222;
    }
    port
}

/// Find a Chrome binary. Discovery order:
///   1. `CHROME_PATH` environment variable
///   2. Common Linux / macOS / Windows paths
///   3. PATH lookup (`which google-chrome`, `which chromium`, ...)
pub fn find_chrome() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_PATH") {
        let pb = PathBuf::from(&p);
        if pb.exists() {
            return Some(pb);
        }
    }

    let candidates: &[&str] = {
        #[cfg(target_os = "linux")]
        {
            &[
                "/usr/bin/google-chrome",
                "/usr/bin/google-chrome-stable",
                "/usr/bin/chromium-browser",
                "/usr/bin/chromium",
                "/usr/local/bin/google-chrome",
                "/snap/bin/chromium",
            ]
        }
        #[cfg(target_os = "macos")]
        {
            &[
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
            ]
        }
        #[cfg(target_os = "windows")]
        {
            &[
                r"C:\Program Files\Google\Chrome\Application\chrome.exe",
                r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            ]
        }
        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            &[]
        }
    };

    for path in candidates {
        let pb = PathBuf::from(path);
        if pb.exists() {
            return Some(pb);
        }
    }

    for name in &[
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(out) = Command::new("which").arg(name).output() {
            if out.status.success() {
                let p = String::from_utf8_lossy(&out.stdout).trim().to_string();
                let pb = PathBuf::from(&p);
                if pb.exists() {
                    return Some(pb);
                }
            }
        }
    }

    None
}

/// Chrome binary for a harness run: the configured path when it exists,
/// discovery otherwise.
pub fn resolve_chrome(settings: &BrowserSettings) -> Option<PathBuf> {
    if let Some(path) = &settings.chrome_path {
        if path.exists() {
            return Some(path.clone());
        }
        tracing::warn!(
            "Configured chrome_path {:?} does not exist, falling back to discovery",
            path
        );
    }
    find_chrome()
}

/// Everything needed to spawn one browser session.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub chrome_path: PathBuf,
    pub user_data_dir: PathBuf,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub lang: String,
    pub debug_port: u16,
    pub extra_args: Vec<String>,
}

impl LaunchOptions {
    pub fn new(chrome_path: PathBuf, user_data_dir: PathBuf) -> Self {
        Self {
            chrome_path,
            user_data_dir,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            lang: "en-US".to_string(),
            debug_port: allocate_debug_port(),
            extra_args: Vec::new(),
        }
    }

    /// Launch options from the harness config; the port is allocated fresh.
    pub fn from_settings(
        settings: &BrowserSettings,
        chrome_path: PathBuf,
        user_data_dir: PathBuf,
    ) -> Self {
        Self {
            chrome_path,
            user_data_dir,
            headless: settings.headless,
            window_width: settings.window_width,
            window_height: settings.window_height,
            lang: settings.lang.clone(),
            debug_port: allocate_debug_port(),
            extra_args: Vec::new(),
        }
    }
}

/// Build the Chrome launch command with all parameters.
pub fn build_command(opts: &LaunchOptions) -> Command {
    let mut cmd = Command::new(&opts.chrome_path);

    cmd.arg(format!("--user-data-dir={}", opts.user_data_dir.display()));
    cmd.arg(format!("--remote-debugging-port={}", opts.debug_port));

    if opts.headless {
        cmd.arg("--headless=new");
        cmd.arg("--disable-gpu");
    }

    cmd.arg(format!(
        "--window-size={},{}",
        opts.window_width, opts.window_height
    ));
    cmd.arg(format!("--lang={}", opts.lang));

    cmd.arg("--no-first-run");
    cmd.arg("--no-default-browser-check");
    cmd.arg("--disable-background-networking");
    cmd.arg("--disable-sync");
    cmd.arg("--disable-default-apps");
    cmd.arg("--disable-crash-reporter");
    cmd.arg("--disable-dev-shm-usage");

    for arg in &opts.extra_args {
        cmd.arg(arg);
    }

    cmd.arg("about:blank");

    cmd
}

/// Validate an explicit Chrome executable path.
pub fn validate_chrome_path(path: &Path) -> crate::error::Result<()> {
    use crate::error::ProbeError;

    if !path.exists() {
        return Err(ProbeError::Validation(format!(
            "Chrome executable not found at {:?}",
            path
        )));
    }

    if !path.is_file() {
        return Err(ProbeError::Validation(format!(
            "Chrome path {:?} is not a file",
            path
        )));
    }

    Ok(())
}
