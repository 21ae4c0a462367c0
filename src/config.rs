use crate::analyzer::days::DayExtractor;
use crate::analyzer::ranking::DEFAULT_TOP_LIMIT;
use crate::analyzer::scoring::ScoreWeights;
use crate::parser::Site;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MerchantConfig {
    pub name: String,
    pub url: String,
    pub site: Site,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub telegram_bot_token: Option<String>,
    #[serde(default)]
    pub telegram_chat_id: Option<i64>,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default)]
    pub merchants: Vec<MerchantConfig>,
    #[serde(default = "default_check_interval")]
    pub check_interval_seconds: u64,
    /// Pause between two merchant fetches, plus up to `fetch_jitter_ms` at random.
    #[serde(default = "default_fetch_delay")]
    pub fetch_delay_ms: u64,
    #[serde(default = "default_fetch_jitter")]
    pub fetch_jitter_ms: u64,
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
    #[serde(default)]
    pub score: ScoreWeights,
    #[serde(default)]
    pub days: DayExtractor,
}

fn default_database_path() -> String {
    "promotions.db".to_string()
}

fn default_check_interval() -> u64 {
    6 * 60 * 60
}

fn default_fetch_delay() -> u64 {
    1200
}

fn default_fetch_jitter() -> u64 {
    800
}

fn default_top_limit() -> usize {
    DEFAULT_TOP_LIMIT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_id: None,
            database_path: default_database_path(),
            merchants: Vec::new(),
            check_interval_seconds: default_check_interval(),
            fetch_delay_ms: default_fetch_delay(),
            fetch_jitter_ms: default_fetch_jitter(),
            top_limit: default_top_limit(),
            score: ScoreWeights::default(),
            days: DayExtractor::default(),
        }
    }
}

impl AppConfig {
    /// Bot credentials, when both are configured.
    pub fn telegram(&self) -> Option<(String, i64)> {
        match (&self.telegram_bot_token, self.telegram_chat_id) {
            (Some(token), Some(chat_id)) if !token.trim().is_empty() => Some((token.clone(), chat_id)),
            _ => None,
        }
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
