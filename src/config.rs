use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::services::encoding::EncodingChoice;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 项目根目录，`novel/` 与 `data/` 都位于其下
    pub root_dir: PathBuf,
    /// 每批并发分析的章节数量
    pub batch_size: usize,
    /// 累计多少章保存一次结果
    pub merge_size: usize,
    /// 批次之间的等待时间（毫秒）
    pub batch_delay_ms: u64,
    /// 重试之间的等待时间（毫秒）
    pub retry_delay_ms: u64,
    /// 生成大纲时每批并发的章纲数量
    pub outline_batch_size: usize,
    /// 源文件编码，`auto` 表示自动检测
    pub source_encoding: String,
    /// 章节标记字符
    pub heading_markers: String,
    /// 是否先按卷分割
    pub volume_mode: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            batch_size: 5,
            merge_size: 30,
            batch_delay_ms: 1000,
            retry_delay_ms: 1000,
            outline_batch_size: 2,
            source_encoding: "gb2312".to_string(),
            heading_markers: "章节回".to_string(),
            volume_mode: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_temperature: 0.1,
            llm_max_tokens: 4096,
            request_timeout_secs: 180,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            root_dir: std::env::var("ROOT_DIR").map(PathBuf::from).unwrap_or(default.root_dir),
            batch_size: env_parse("BATCH_SIZE").unwrap_or(default.batch_size),
            merge_size: env_parse("MERGE_SIZE").unwrap_or(default.merge_size),
            batch_delay_ms: env_parse("BATCH_DELAY_MS").unwrap_or(default.batch_delay_ms),
            retry_delay_ms: env_parse("RETRY_DELAY_MS").unwrap_or(default.retry_delay_ms),
            outline_batch_size: env_parse("OUTLINE_BATCH_SIZE").unwrap_or(default.outline_batch_size),
            source_encoding: std::env::var("SOURCE_ENCODING").unwrap_or(default.source_encoding),
            heading_markers: std::env::var("HEADING_MARKERS").unwrap_or(default.heading_markers),
            volume_mode: env_parse("VOLUME_MODE").unwrap_or(default.volume_mode),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_temperature: env_parse("LLM_TEMPERATURE").unwrap_or(default.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS").unwrap_or(default.llm_max_tokens),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(default.request_timeout_secs),
        }
    }

    /// 从 TOML 文件加载配置，缺失的字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroValue { name: "batch_size" });
        }
        if self.merge_size == 0 {
            return Err(ConfigError::ZeroValue { name: "merge_size" });
        }
        if self.outline_batch_size == 0 {
            return Err(ConfigError::ZeroValue {
                name: "outline_batch_size",
            });
        }
        if self.heading_markers.trim().is_empty() {
            return Err(ConfigError::EmptyMarkers);
        }
        self.encoding_choice()?;
        Ok(())
    }

    pub fn encoding_choice(&self) -> Result<EncodingChoice, ConfigError> {
        EncodingChoice::from_label(&self.source_encoding)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
