//! 源文件编码处理
//!
//! 默认使用配置中固定的编码；配置为 `auto` 时按候选列表逐个试解码，
//! 第一个解出中文字符的编码即被采用。
//!
//! `encoding_rs` 中 GBK 与 GB18030 共用同一个解码器（gb2312 也映射到 GBK），
//! 所以简体只需尝试 GBK 一次，GB18030 的四字节序列同样能被它解出。

use encoding_rs::{Encoding, BIG5, GBK, UTF_8};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// 编码选择方式
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EncodingChoice {
    /// 固定编码
    Fixed(&'static Encoding),
    /// 自动检测
    Detect,
}

impl EncodingChoice {
    /// 从配置中的编码名称解析，`auto` 表示自动检测
    pub fn from_label(label: &str) -> Result<Self, ConfigError> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("auto") {
            return Ok(Self::Detect);
        }
        Encoding::for_label(label.as_bytes())
            .map(Self::Fixed)
            .ok_or_else(|| ConfigError::UnknownEncoding {
                label: label.to_string(),
            })
    }
}

/// 检测顺序：UTF-8、简体（GBK/GB18030）、繁体
fn candidates() -> [&'static Encoding; 3] {
    [UTF_8, GBK, BIG5]
}

fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// 试解码检测编码，全部不匹配时返回 UTF-8
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    for encoding in candidates() {
        // 解码失败视为不匹配
        match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            Some(text) if contains_cjk(&text) => {
                debug!("检测到文件编码: {}", encoding.name());
                return encoding;
            }
            _ => continue,
        }
    }
    debug!("未检测到中文编码，默认使用 UTF-8");
    UTF_8
}

/// 根据配置确定编码
pub fn resolve(bytes: &[u8], choice: EncodingChoice) -> &'static Encoding {
    match choice {
        EncodingChoice::Fixed(encoding) => encoding,
        EncodingChoice::Detect => detect_encoding(bytes),
    }
}

/// 按指定编码解码，非法字节替换为 U+FFFD
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, actual, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!("使用 {} 解码时存在无法识别的字节，已替换", actual.name());
    }
    text.into_owned()
}
