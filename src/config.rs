use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Upper bound the VK API accepts for `groups.getMembers` page sizes.
pub const MAX_OFFSET_SIZE: u64 = 1000;
/// Upper bound on how many subscriptions are recorded per user.
pub const MAX_SUB_LIMIT: usize = 500;

/// What the crawl does when a single user's subscription lookup fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CrawlPolicy {
    /// Abort the whole batch on the first failed user.
    #[default]
    HaltOnError,
    /// Log the failed user and keep going with the rest of the batch.
    SkipAndContinue,
}

#[derive(Clone)]
pub struct Config {
    pub access_token: String,
    pub api_version: String,
    pub api_url: String,
    pub api_rps: u32,
    pub group_id: String,
    pub offset_size: u64,
    pub user_limit: u64,
    pub sub_limit: usize,
    pub crawl_policy: CrawlPolicy,
    pub db_url: String,
    pub db_path: String,
    pub logs_path: PathBuf,
}

impl Config {
    /// Reads the configuration from the environment and validates bounds.
    pub fn load() -> Result<Self, AppError> {
        let crawl_policy = match env_or("CRAWL_POLICY", "halt").as_str() {
            "halt" => CrawlPolicy::HaltOnError,
            "skip" => CrawlPolicy::SkipAndContinue,
            other => {
                return Err(AppError::ConfigurationError {
                    msg: format!("CRAWL_POLICY must be \"halt\" or \"skip\", got \"{other}\""),
                });
            }
        };

        let config = Self {
            access_token: require("VK_TOKEN")?,
            api_version: env_or("VK_API_VERSION", "5.131"),
            api_url: env_or("VK_API_URL", "https://api.vk.com/method"),
            api_rps: parse_env("VK_API_RPS", 3)?,
            group_id: require("VK_GROUP_ID")?,
            offset_size: parse_env("VK_OFFSET_SIZE", MAX_OFFSET_SIZE)?,
            user_limit: parse_env("VK_USER_LIMIT", 100)?,
            sub_limit: parse_env("VK_SUB_LIMIT", MAX_SUB_LIMIT)?,
            crawl_policy,
            db_url: env_or("DB_URL", "sqlite://data.db"),
            db_path: env_or("DB_PATH", "data.db"),
            logs_path: PathBuf::from(env_or("LOGS_PATH", "logs")),
        };

        config.validate()?;
        Ok(config)
    }

    /// Bounds are checked once here, not re-checked per call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.offset_size == 0 || self.offset_size > MAX_OFFSET_SIZE {
            return Err(AppError::ConfigurationError {
                msg: format!(
                    "VK_OFFSET_SIZE must be between 1 and {MAX_OFFSET_SIZE}, got {}",
                    self.offset_size
                ),
            });
        }
        if self.sub_limit == 0 || self.sub_limit > MAX_SUB_LIMIT {
            return Err(AppError::ConfigurationError {
                msg: format!(
                    "VK_SUB_LIMIT must be between 1 and {MAX_SUB_LIMIT}, got {}",
                    self.sub_limit
                ),
            });
        }
        if self.api_rps == 0 {
            return Err(AppError::ConfigurationError {
                msg: "VK_API_RPS must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            api_version: "5.131".to_string(),
            api_url: "https://api.vk.com/method".to_string(),
            api_rps: 3,
            group_id: String::new(),
            offset_size: MAX_OFFSET_SIZE,
            user_limit: 100,
            sub_limit: MAX_SUB_LIMIT,
            crawl_policy: CrawlPolicy::default(),
            db_url: "sqlite://data.db".to_string(),
            db_path: "data.db".to_string(),
            logs_path: PathBuf::from("logs"),
        }
    }
}

fn require(key: &str) -> Result<String, AppError> {
    std::env::var(key).map_err(|_| AppError::MissingConfig {
        key: key.to_string(),
    })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|_| AppError::ConfigurationError {
            msg: format!("{key} must be a number, got \"{raw}\""),
        }),
        Err(_) => Ok(default),
    }
}
