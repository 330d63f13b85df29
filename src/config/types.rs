use crate::crawler::ParserKind;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main configuration structure for Shutter-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub site: SiteConfig,
    pub selectors: SelectorConfig,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight at once
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Upper bound on a single fetch, in seconds
    #[serde(rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,

    /// Upper bound on establishing a connection, in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Log a progress line every N completed requests
    #[serde(rename = "progress-interval", default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl CrawlerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_progress_interval() -> u64 {
    10
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON Lines file receiving items
    #[serde(rename = "items-path")]
    pub items_path: String,

    /// Directory receiving downloaded images
    #[serde(rename = "images-dir")]
    pub images_dir: String,
}

/// Naming policy for stored assets
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Extensions kept as-is (compared case-insensitively, leading dot included)
    #[serde(rename = "allowed-extensions", default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Extension appended when the source name carries none of the allowed ones
    #[serde(rename = "default-extension", default = "default_extension")]
    pub default_extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            default_extension: default_extension(),
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()]
}

fn default_extension() -> String {
    ".jpg".to_string()
}

/// Which of the two extraction contracts a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpiderMode {
    /// Seeds are listing pages; listing -> detail, nothing deeper
    SingleLevel,
    /// Seeds are walked through the rule table; content pages recurse
    Recursive,
}

impl fmt::Display for SpiderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleLevel => write!(f, "single-level"),
            Self::Recursive => write!(f, "recursive"),
        }
    }
}

/// Site being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub mode: SpiderMode,

    /// Seed URLs
    #[serde(rename = "start-urls")]
    pub start_urls: Vec<String>,

    /// Domain patterns (e.g., "example.com" or "*.example.com"); empty means unrestricted
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,
}

/// CSS selectors locating each extracted field
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Anchors pointing at individual image pages
    #[serde(rename = "thumbnail-links")]
    pub thumbnail_links: String,

    /// Element carrying the multi-resolution descriptor
    #[serde(rename = "image-descriptor")]
    pub image_descriptor: String,

    /// Attribute on that element holding the descriptor
    #[serde(rename = "descriptor-attribute", default = "default_descriptor_attribute")]
    pub descriptor_attribute: String,

    /// Header text used as the item name
    pub title: String,

    /// Breadcrumb-like category texts
    pub categories: String,
}

fn default_descriptor_attribute() -> String {
    "srcset".to_string()
}

/// One `[[rule]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct RuleConfig {
    /// CSS selector restricting where links are extracted
    pub scope: String,

    #[serde(default = "default_follow")]
    pub follow: bool,

    /// Parser for matched pages; absent means discover-only
    #[serde(default)]
    pub parser: Option<ParserKind>,
}

fn default_follow() -> bool {
    true
}
