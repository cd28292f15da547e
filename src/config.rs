use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Address the command listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Page opened when the driven browser starts.
    #[serde(default = "default_start_url")]
    pub start_url: String,
    /// Where the per-tab condition registry is persisted.
    #[serde(default = "default_state_path")]
    pub state_path: String,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub tuning: Tuning,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            start_url: default_start_url(),
            state_path: default_state_path(),
            browser: BrowserConfig::default(),
            speech: SpeechConfig::default(),
            services: ServicesConfig::default(),
            tuning: Tuning::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if path.exists() {
            fs::read_to_string(path)
                .ok()
                .and_then(|s| toml::from_str(&s).ok())
                .unwrap_or_default()
        } else {
            Config::default()
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:5005".into()
}

fn default_start_url() -> String {
    "about:blank".into()
}

fn default_state_path() -> String {
    "conditions.json".into()
}

// ============================================================================
// Browser
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BrowserConfig {
    /// Show the browser window. Users of the visual filters need to see the
    /// page, so headful is the default.
    #[serde(default = "default_headful")]
    pub headful: bool,
    /// Attach to a running Chromium over its DevTools websocket instead of
    /// launching one.
    #[serde(default)]
    pub debug_ws_url: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headful: default_headful(),
            debug_ws_url: None,
        }
    }
}

fn default_headful() -> bool {
    true
}

// ============================================================================
// Speech
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SpeechConfig {
    /// Synthesizer program. Unset picks `say` on macOS and `espeak-ng`
    /// elsewhere; "console" prints instead of speaking.
    #[serde(default)]
    pub program: Option<String>,
    /// Speaking rate in words per minute.
    #[serde(default)]
    pub rate: Option<u32>,
}

// ============================================================================
// External services
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_summarize_url")]
    pub summarize_url: String,
    #[serde(default = "default_detect_url")]
    pub detect_url: String,
    #[serde(default = "default_register_url")]
    pub register_url: String,
    #[serde(default = "default_recognize_url")]
    pub recognize_url: String,
    /// Route each transcript through the recognition relay before
    /// interpreting it.
    #[serde(default)]
    pub recognize_relay: bool,
    #[serde(default = "default_service_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            summarize_url: default_summarize_url(),
            detect_url: default_detect_url(),
            register_url: default_register_url(),
            recognize_url: default_recognize_url(),
            recognize_relay: false,
            timeout_secs: default_service_timeout(),
        }
    }
}

fn default_summarize_url() -> String {
    "http://localhost:5000/summarize".into()
}

fn default_detect_url() -> String {
    "http://127.0.0.1:5000/detect".into()
}

fn default_register_url() -> String {
    "http://127.0.0.1:5000/register".into()
}

fn default_recognize_url() -> String {
    "http://localhost:5001/recognize".into()
}

fn default_service_timeout() -> u64 {
    30
}

// ============================================================================
// Executor tuning
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Tuning {
    /// Pixels scrolled by "scroll down"/"scroll up".
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
    /// Delay before speaking after a scroll or feed read, letting the page
    /// settle.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Bounded wait for a late-loading video element.
    #[serde(default = "default_video_poll_attempts")]
    pub video_poll_attempts: u32,
    #[serde(default = "default_video_poll_interval_ms")]
    pub video_poll_interval_ms: u64,
    /// Most blocks "read all text" will speak.
    #[serde(default = "default_read_all_limit")]
    pub read_all_limit: usize,
    /// Most results "read all results" will speak.
    #[serde(default = "default_results_limit")]
    pub results_limit: usize,
    /// Most content blocks "read section" will speak.
    #[serde(default = "default_section_limit")]
    pub section_limit: usize,
    /// Character cap on text submitted for summarization.
    #[serde(default = "default_summary_char_limit")]
    pub summary_char_limit: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            scroll_step: default_scroll_step(),
            settle_ms: default_settle_ms(),
            video_poll_attempts: default_video_poll_attempts(),
            video_poll_interval_ms: default_video_poll_interval_ms(),
            read_all_limit: default_read_all_limit(),
            results_limit: default_results_limit(),
            section_limit: default_section_limit(),
            summary_char_limit: default_summary_char_limit(),
        }
    }
}

fn default_scroll_step() -> f64 {
    500.0
}

fn default_settle_ms() -> u64 {
    600
}

fn default_video_poll_attempts() -> u32 {
    20
}

fn default_video_poll_interval_ms() -> u64 {
    500
}

fn default_read_all_limit() -> usize {
    10
}

fn default_results_limit() -> usize {
    5
}

fn default_section_limit() -> usize {
    3
}

fn default_summary_char_limit() -> usize {
    15_000
}
