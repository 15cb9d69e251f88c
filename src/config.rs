//! Configuration types for fillbass

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Shape of the remote hierarchy below a game directory
///
/// The defaults describe the gameday XML tree: game folders start with `gid`,
/// the play-by-play document lives at `inning/inning_all.xml`, and players are
/// listed under `pitchers/` and `batters/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Prefix marking a day-listing anchor as a real game entry (default: "gid")
    #[serde(default = "default_game_prefix")]
    pub game_prefix: String,

    /// Leading character of entity-listing header rows that must be skipped (default: 'P')
    #[serde(default = "default_header_marker")]
    pub header_marker: char,

    /// Primary data file, relative to the game URL (default: "inning/inning_all.xml")
    #[serde(default = "default_primary_file")]
    pub primary_file: String,

    /// Entity listing endpoints under each game (default: ["pitchers", "batters"])
    #[serde(default = "default_entity_categories")]
    pub entity_categories: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            game_prefix: default_game_prefix(),
            header_marker: default_header_marker(),
            primary_file: default_primary_file(),
            entity_categories: default_entity_categories(),
        }
    }
}

impl LayoutConfig {
    /// File name the primary document is stored under inside the local game directory
    pub fn primary_file_name(&self) -> &str {
        self.primary_file
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(self.primary_file.as_str())
    }
}

/// How a day is judged to be already fetched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeMode {
    /// The day directory existing means the day is done (default)
    #[default]
    Directory,
    /// A per-day manifest records finished games; only a manifest marked complete skips the day
    Manifest,
}

impl std::str::FromStr for ResumeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "directory" | "dir" => Ok(ResumeMode::Directory),
            "manifest" => Ok(ResumeMode::Manifest),
            other => Err(Error::Config {
                message: format!("unknown resume mode '{other}' (expected directory or manifest)"),
                key: Some("resume".to_string()),
            }),
        }
    }
}

/// Caller-side retry policy for transient failures
///
/// The HTTP client never retries on its own. The default of zero attempts keeps
/// every miss permanent for the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try (default: 0)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration for [`GamedayFetcher`](crate::GamedayFetcher)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root of the remote tree; day folders are resolved below it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Local directory the tree is mirrored into (default: "data")
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,

    /// Number of days fetched in parallel (default: 8)
    #[serde(default = "default_max_concurrent_days")]
    pub max_concurrent_days: usize,

    /// Idle connections kept per host by the shared client (default: 100)
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Deadline for a single request including body (default: 60 seconds, None = unlimited)
    #[serde(
        default = "default_request_timeout",
        with = "optional_duration_serde"
    )]
    pub request_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Remote hierarchy shape
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Completion tracking mode
    #[serde(default)]
    pub resume: ResumeMode,

    /// Retry policy applied by the fetch units
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            local_root: default_local_root(),
            max_concurrent_days: default_max_concurrent_days(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            layout: LayoutConfig::default(),
            resume: ResumeMode::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::filesystem(path, e))?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.base_url).map_err(|e| Error::Config {
            message: format!("base_url '{}' is not a valid URL: {}", self.base_url, e),
            key: Some("base_url".to_string()),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("base_url must be http or https, got '{}'", base.scheme()),
                key: Some("base_url".to_string()),
            });
        }
        if self.max_concurrent_days == 0 {
            return Err(Error::Config {
                message: "max_concurrent_days must be at least 1".to_string(),
                key: Some("max_concurrent_days".to_string()),
            });
        }
        if self.layout.game_prefix.is_empty() {
            return Err(Error::Config {
                message: "game_prefix must not be empty".to_string(),
                key: Some("layout.game_prefix".to_string()),
            });
        }
        if self.layout.entity_categories.is_empty() {
            return Err(Error::Config {
                message: "at least one entity category is required".to_string(),
                key: Some("layout.entity_categories".to_string()),
            });
        }
        Ok(())
    }

    /// Base URL with exactly one trailing slash, so relative joins descend into it
    pub fn base_dir_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://gd2.mlb.com/components/game/mlb/".to_string()
}

fn default_local_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_concurrent_days() -> usize {
    8
}

fn default_pool_max_idle_per_host() -> usize {
    100
}

fn default_request_timeout() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_user_agent() -> String {
    concat!("fillbass/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_game_prefix() -> String {
    "gid".to_string()
}

fn default_header_marker() -> char {
    'P'
}

fn default_primary_file() -> String {
    "inning/inning_all.xml".to_string()
}

fn default_entity_categories() -> Vec<String> {
    vec!["pitchers".into(), "batters".into()]
}

fn default_true() -> bool {
    true
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
