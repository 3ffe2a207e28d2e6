//! 章节分析能力
//!
//! 编排层只依赖这个 trait，不关心背后是哪家模型服务。

use async_trait::async_trait;

use crate::error::AnalysisError;

/// 一次分析的输出
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutput {
    pub text: String,
}

impl AnalysisOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 外部文本分析服务
///
/// 任何失败（鉴权、限流、响应格式、网络）都以 [`AnalysisError`] 返回，
/// 由调用方记录为失败结果。
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, chapter_text: &str) -> Result<AnalysisOutput, AnalysisError>;
}
