use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Target deployment of the demo app
    #[serde(default)]
    pub environment: Environment,

    /// Chrome launch settings
    #[serde(default)]
    pub browser: BrowserSettings,

    /// Login credentials accepted by the demo app
    #[serde(default)]
    pub credentials: Credentials,

    /// Expense chart approval settings
    #[serde(default)]
    pub canvas: CanvasSettings,

    /// Visual checkpoint settings
    #[serde(default)]
    pub visual: VisualSettings,
}

impl HarnessConfig {
    /// Apply environment-variable overrides on top of whatever the file said.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("ACMEPROBE_BASE_URL") {
            if !url.is_empty() {
                self.environment.base_url = url;
            }
        }
        if let Ok(path) = std::env::var("CHROME_PATH") {
            if !path.is_empty() {
                self.browser.chrome_path = Some(PathBuf::from(path));
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Base URL the login page is served from
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Explicit Chrome executable; discovery runs when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// The canvas reference digests were recorded at 1920x1080
    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            lang: default_lang(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            user: default_user(),
            password: default_password(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasSettings {
    /// The chart draw animation runs for a known, fixed duration
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// MD5 of the exported data URL with the default two-year dataset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_two_years: Option<String>,

    /// MD5 of the exported data URL after adding the third year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_three_years: Option<String>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            reference_two_years: None,
            reference_three_years: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualSettings {
    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_baseline_dir")]
    pub baseline_dir: PathBuf,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            baseline_dir: default_baseline_dir(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn default_base_url() -> String {
    "https://demo.applitools.com/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_lang() -> String {
    "en-US".to_string()
}

fn default_user() -> String {
    "user".to_string()
}

fn default_password() -> String {
    "password".to_string()
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_app_name() -> String {
    "DemoApp".to_string()
}

fn default_baseline_dir() -> PathBuf {
    PathBuf::from(".visual-baselines")
}

fn default_viewport_width() -> u32 {
    1024
}

fn default_viewport_height() -> u32 {
    768
}
