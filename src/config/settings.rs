use crate::config::toml_config::FileConfig;
use crate::config::CliConfig;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_image_size, validate_non_empty_string, validate_path, validate_positive_number,
    validate_url, Validate,
};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.whomeai.com/v1/images/generations";
pub const DEFAULT_API_KEY: &str = "sk-demo";
pub const DEFAULT_MODEL: &str = "nano-banana";
pub const DEFAULT_SIZE: &str = "1792x1024";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BATCH_DELAY_SECS: u64 = 25;
pub const DEFAULT_IMAGES_DIR: &str = "images";
pub const API_KEY_ENV: &str = "WHOMEAI_API_KEY";

/// Effective configuration after merging CLI flags, environment, config
/// file and built-in defaults, in that order of precedence.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub size: String,
    pub timeout_secs: u64,
    pub retry_on_rate_limit: bool,
    pub images_dir: String,
    pub batch_delay_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            model: DEFAULT_MODEL.to_string(),
            size: DEFAULT_SIZE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_on_rate_limit: true,
            images_dir: DEFAULT_IMAGES_DIR.to_string(),
            batch_delay_secs: DEFAULT_BATCH_DELAY_SECS,
        }
    }
}

impl Settings {
    pub fn resolve(cli: &CliConfig, file: Option<&FileConfig>) -> Self {
        Self::resolve_with_env(cli, file, std::env::var(API_KEY_ENV).ok())
    }

    pub fn resolve_with_env(
        cli: &CliConfig,
        file: Option<&FileConfig>,
        env_api_key: Option<String>,
    ) -> Self {
        let file = file.cloned().unwrap_or_default();
        let defaults = Self::default();

        // 空字串視同未設定
        let not_blank = |key: &String| !key.trim().is_empty();
        let api_key = cli
            .api_key
            .clone()
            .filter(not_blank)
            .or(env_api_key.filter(not_blank))
            .or(file.api.key)
            .unwrap_or(defaults.api_key)
            .trim()
            .to_string();

        let retry_on_rate_limit = if cli.no_retry {
            false
        } else {
            file.api.retry_on_rate_limit.unwrap_or(defaults.retry_on_rate_limit)
        };

        Self {
            api_url: cli
                .api_url
                .clone()
                .or(file.api.url)
                .unwrap_or(defaults.api_url),
            api_key,
            model: cli.model.clone().or(file.api.model).unwrap_or(defaults.model),
            size: cli.size.clone().or(file.api.size).unwrap_or(defaults.size),
            timeout_secs: cli
                .timeout
                .or(file.api.timeout_seconds)
                .unwrap_or(defaults.timeout_secs),
            retry_on_rate_limit,
            images_dir: cli
                .images_dir
                .clone()
                .or(file.batch.images_dir)
                .unwrap_or(defaults.images_dir),
            batch_delay_secs: cli
                .delay
                .or(file.batch.delay_seconds)
                .unwrap_or(defaults.batch_delay_secs),
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api_url", &self.api_url)?;
        validate_non_empty_string("api_key", &self.api_key)?;
        validate_non_empty_string("model", &self.model)?;
        validate_image_size("size", &self.size)?;
        validate_positive_number("timeout", self.timeout_secs, 1)?;
        validate_path("images_dir", &self.images_dir)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn api_key(&self) -> &str {
        &self.api_key
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn size(&self) -> &str {
        &self.size
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn retry_on_rate_limit(&self) -> bool {
        self.retry_on_rate_limit
    }
}
