use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::models::chapter::ChapterRecord;

/// 分析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Success,
    Failed,
}

/// 单章分析结果
///
/// 成功时只有 `analysis`，失败时只有 `error`。
/// 重试时整条替换，不修改字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub chapter_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    #[serde(default)]
    pub analysis: Option<String>,
    pub status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn success(chapter: &ChapterRecord, analysis: impl Into<String>) -> Self {
        Self {
            chapter_number: chapter.number(),
            chapter_title: chapter.title().map(str::to_string),
            analysis: Some(analysis.into()),
            status: AnalysisStatus::Success,
            error: None,
        }
    }

    pub fn failed(chapter: &ChapterRecord, error: &AnalysisError) -> Self {
        Self {
            chapter_number: chapter.number(),
            chapter_title: chapter.title().map(str::to_string),
            analysis: None,
            status: AnalysisStatus::Failed,
            error: Some(error.message.clone()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == AnalysisStatus::Failed
    }

    /// `第N章 标题`
    pub fn header(&self) -> String {
        match &self.chapter_title {
            Some(title) => format!("第{}章 {}", self.chapter_number, title),
            None => format!("第{}章", self.chapter_number),
        }
    }
}
