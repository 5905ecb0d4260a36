use crate::error::{Error, Result};
use crate::services::parser::ParserConfig;
use crate::utils::get_snapshot_db_path;
use dotenvy::dotenv;
use log::LevelFilter;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 后端地址，未配置时无法加载试卷回顾
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub snapshot_db: PathBuf,
    pub log_level: LevelFilter,
    /// 简答题 AI 评分及格线（0-100）
    pub short_answer_pass_score: f64,
    pub report_skipped_blocks: bool,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            snapshot_db: get_snapshot_db_path(),
            log_level: LevelFilter::Info,
            short_answer_pass_score: 60.0,
            report_skipped_blocks: false,
            request_timeout_secs: 15,
        }
    }
}

impl AppConfig {
    /// 读取 `.env` 与 `TIKU_*` 环境变量，缺省项使用默认值
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            api_base_url: get_env_opt("TIKU_API_BASE_URL"),
            api_token: get_env_opt("TIKU_API_TOKEN"),
            snapshot_db: get_env_opt("TIKU_SNAPSHOT_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_db),
            log_level: get_env_parse_or("TIKU_LOG_LEVEL", defaults.log_level)?,
            short_answer_pass_score: get_env_parse_or(
                "TIKU_SHORT_ANSWER_PASS_SCORE",
                defaults.short_answer_pass_score,
            )?,
            report_skipped_blocks: get_env_parse_or(
                "TIKU_REPORT_SKIPPED_BLOCKS",
                defaults.report_skipped_blocks,
            )?,
            request_timeout_secs: get_env_parse_or(
                "TIKU_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
        })
    }

    pub fn parser_config(&self) -> ParserConfig {
        ParserConfig {
            report_skipped_blocks: self.report_skipped_blocks,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("配置项 {} 的值无效: {}", name, e))),
        None => Ok(default),
    }
}
