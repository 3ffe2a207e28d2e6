use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
///
/// 每一种致命情况都有独立的变体，调用方可以据此区分处理。
/// 单章分析失败不在此列，见 [`AnalysisError`]。
#[derive(Debug, Error)]
pub enum AppError {
    /// 源文件不存在
    #[error("文件不存在: {}", path.display())]
    MissingInput { path: PathBuf },

    /// 分章后没有得到任何非空章节
    #[error("未找到任何章节，请检查文件格式是否正确: {}", path.display())]
    NoChaptersFound { path: PathBuf },

    /// 章节文件名无法解析出章节号
    #[error("文件名 {file} 不是有效的章节文件")]
    InvalidChapterFile { file: String },

    /// 章节目录中没有任何章节文件
    #[error("在目录 {} 中未找到任何 .txt 章节文件", path.display())]
    EmptyCorpus { path: PathBuf },

    /// 章节文件内容为空
    #[error("文件 {file} 内容为空")]
    EmptyChapter { file: String },

    /// 两个文件解析出相同的章节号
    #[error("章节号 {number} 重复: {first} 与 {second}")]
    DuplicateChapter {
        number: u32,
        first: String,
        second: String,
    },

    /// 重试时找不到对应章节文件
    #[error("未找到第 {number} 章的 TXT 文件")]
    ChapterFileNotFound { number: u32 },

    /// 目录或文件无法创建/写入/读取
    #[error("文件操作失败 ({}): {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 结果文件无法解析
    #[error("结果文件解析失败 ({}): {source}", path.display())]
    CorruptBatch {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 批次内出现单章捕获范围之外的异常
    #[error("处理第 {first} 到 {last} 章的批次时出错: {reason}")]
    GroupAborted { first: u32, last: u32, reason: String },

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 数值参数不合法
    #[error("参数 {name} 必须大于 0")]
    ZeroValue { name: &'static str },

    /// 未知的编码名称
    #[error("不支持的编码: {label}")]
    UnknownEncoding { label: String },

    /// 章节标记为空
    #[error("章节标记不能为空")]
    EmptyMarkers,

    /// 章节标记无法组成合法的正则表达式
    #[error("章节匹配规则无效: {source}")]
    InvalidHeadingPattern {
        #[source]
        source: regex::Error,
    },

    /// 配置文件读取失败
    #[error("无法读取配置文件 {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 配置文件解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// 单章分析失败
///
/// 可恢复错误：记录进失败的分析结果，等待重试流程处理。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct AnalysisError {
    pub message: String,
}

impl AnalysisError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件操作错误
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// 创建结果文件解析错误
    pub fn corrupt_batch(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        AppError::CorruptBatch {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_distinguishable() {
        let missing = AppError::MissingInput {
            path: PathBuf::from("novel/x.txt"),
        };
        let empty = AppError::EmptyCorpus {
            path: PathBuf::from("data/x/chapters"),
        };

        assert!(matches!(missing, AppError::MissingInput { .. }));
        assert!(missing.to_string().contains("novel/x.txt"));
        assert!(empty.to_string().contains("data/x/chapters"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: AppError = ConfigError::ZeroValue { name: "batch_size" }.into();
        assert!(matches!(err, AppError::Config(ConfigError::ZeroValue { .. })));
        assert!(err.to_string().contains("batch_size"));
    }
}
