//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Fetch target and polling behavior
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// How posts are located in the listing markup
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Condition spreadsheet settings
    #[serde(default)]
    pub conditions: ConditionsConfig,

    /// Notification delivery
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// User-facing message templates
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.watcher.url)
            .map_err(|e| AppError::validation(format!("watcher.url is invalid: {e}")))?;
        if self.watcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("watcher.user_agent is empty"));
        }
        self.watcher.encoding()?;
        if self.watcher.interval_secs == 0 {
            return Err(AppError::validation("watcher.interval_secs must be > 0"));
        }
        if self.watcher.timeout_secs == 0 {
            return Err(AppError::validation("watcher.timeout_secs must be > 0"));
        }
        if self.extraction.container_classes.is_empty() {
            return Err(AppError::validation(
                "extraction.container_classes is empty",
            ));
        }
        for selector in self.extraction.item_selectors() {
            parse_selector(&selector)?;
        }
        parse_selector(&self.extraction.title_selector)?;
        parse_selector(&self.extraction.description_selector)?;
        if let Some(webhook) = &self.notifier.webhook_url {
            url::Url::parse(webhook).map_err(|e| {
                AppError::validation(format!("notifier.webhook_url is invalid: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Fetch target and polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Listing page to poll
    #[serde(default = "defaults::url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// WHATWG label of the page encoding
    #[serde(default = "defaults::encoding")]
    pub encoding: String,

    /// Fail the tick on malformed byte sequences instead of replacing them
    #[serde(default = "defaults::strict_decoding")]
    pub strict_decoding: bool,

    /// Seconds between ticks
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl WatcherConfig {
    /// Resolve the configured encoding label.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        Encoding::for_label(self.encoding.trim().as_bytes()).ok_or_else(|| {
            AppError::validation(format!("Unknown encoding label '{}'", self.encoding))
        })
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            url: defaults::url(),
            user_agent: defaults::user_agent(),
            encoding: defaults::encoding(),
            strict_decoding: defaults::strict_decoding(),
            interval_secs: defaults::interval(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Structural selectors for the listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Class names of the containers holding list items, in scan order
    #[serde(default = "defaults::container_classes")]
    pub container_classes: Vec<String>,

    /// Selector for an item inside a container
    #[serde(default = "defaults::item_selector")]
    pub item_selector: String,

    /// Selector for the title anchor within an item
    #[serde(default = "defaults::title_selector")]
    pub title_selector: String,

    /// Selector for the description element within an item
    #[serde(default = "defaults::description_selector")]
    pub description_selector: String,
}

impl ExtractionConfig {
    /// One item selector per container class, e.g. `.type06_headline li`.
    pub fn item_selectors(&self) -> Vec<String> {
        self.container_classes
            .iter()
            .map(|class| format!(".{} {}", class.trim(), self.item_selector))
            .collect()
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            container_classes: defaults::container_classes(),
            item_selector: defaults::item_selector(),
            title_selector: defaults::title_selector(),
            description_selector: defaults::description_selector(),
        }
    }
}

/// Condition spreadsheet settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConditionsConfig {
    /// Spreadsheet loaded at startup when no file is given on the command line
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Treat the first row as a header
    #[serde(default)]
    pub skip_header: bool,
}

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Webhook receiving `{title, body, priority}` JSON; log output when unset
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Priority hint sent with each notification
    #[serde(default = "defaults::priority")]
    pub priority: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            priority: defaults::priority(),
        }
    }
}

/// Message templates. Placeholders: `{condition}`, `{tag}`, `{title}`, `{description}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "defaults::notification_title")]
    pub notification_title: String,
    #[serde(default = "defaults::notification_body")]
    pub notification_body: String,
    #[serde(default = "defaults::match_feedback")]
    pub match_feedback: String,
    #[serde(default = "defaults::no_match_feedback")]
    pub no_match_feedback: String,
    #[serde(default = "defaults::fetch_failed_feedback")]
    pub fetch_failed_feedback: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            notification_title: defaults::notification_title(),
            notification_body: defaults::notification_body(),
            match_feedback: defaults::match_feedback(),
            no_match_feedback: defaults::no_match_feedback(),
            fetch_failed_feedback: defaults::fetch_failed_feedback(),
        }
    }
}

mod defaults {
    // Watcher defaults
    pub fn url() -> String {
        "https://news.naver.com/main/list.naver?mode=LSD&mid=sec&sid1=001".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0".into()
    }
    pub fn encoding() -> String {
        "euc-kr".into()
    }
    pub fn strict_decoding() -> bool {
        true
    }
    pub fn interval() -> u64 {
        3
    }
    pub fn timeout() -> u64 {
        10
    }

    // Extraction defaults
    pub fn container_classes() -> Vec<String> {
        vec!["type06_headline".into(), "type06".into()]
    }
    pub fn item_selector() -> String {
        "li".into()
    }
    pub fn title_selector() -> String {
        "dt:not(.photo) a".into()
    }
    pub fn description_selector() -> String {
        "dd".into()
    }

    // Notifier defaults
    pub fn priority() -> String {
        "high".into()
    }

    // Message defaults
    pub fn notification_title() -> String {
        "Keyword Found!".into()
    }
    pub fn notification_body() -> String {
        "[{tag}] {title}\n{description}".into()
    }
    pub fn match_feedback() -> String {
        "Condition: {condition}\nTag: {tag}\nTitle: {title}\nDescription: {description}".into()
    }
    pub fn no_match_feedback() -> String {
        "No matches found. Refreshing...".into()
    }
    pub fn fetch_failed_feedback() -> String {
        "Could not load the page. Retrying on the next check.".into()
    }
}
