//! 单章处理流程 - 流程层
//!
//! 调用分析服务并把成功或失败都收敛成一条 [`AnalysisResult`]。
//! 单章失败只会被记录，不会向上传播。

use std::sync::Arc;

use tracing::{info, warn};

use crate::models::{AnalysisResult, ChapterRecord};
use crate::services::AnalysisService;
use crate::utils::logging::truncate_text;

/// 单章处理流程
///
/// 不持有任何文件资源，只依赖注入的分析服务
#[derive(Clone)]
pub struct ChapterFlow {
    service: Arc<dyn AnalysisService>,
}

impl ChapterFlow {
    pub fn new(service: Arc<dyn AnalysisService>) -> Self {
        Self { service }
    }

    pub async fn run(&self, chapter: &ChapterRecord) -> AnalysisResult {
        match self.service.analyze(chapter.body()).await {
            Ok(output) => {
                info!(
                    "[第{}章] ✓ 分析完成: {}",
                    chapter.number(),
                    truncate_text(&output.text, 30)
                );
                AnalysisResult::success(chapter, output.text)
            }
            Err(e) => {
                warn!("[第{}章] ❌ 分析失败: {}", chapter.number(), e);
                AnalysisResult::failed(chapter, &e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::models::AnalysisStatus;
    use crate::services::AnalysisOutput;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl AnalysisService for Echo {
        async fn analyze(&self, chapter_text: &str) -> Result<AnalysisOutput, AnalysisError> {
            if chapter_text.contains("坏") {
                Err(AnalysisError::new("401 Unauthorized"))
            } else {
                Ok(AnalysisOutput::new(format!("摘要:{}", chapter_text)))
            }
        }
    }

    #[tokio::test]
    async fn test_success_and_failure_are_captured() {
        let flow = ChapterFlow::new(Arc::new(Echo));

        let good = ChapterRecord::new(1, Some("好".to_string()), "第1章 好");
        let result = flow.run(&good).await;
        assert_eq!(result.status, AnalysisStatus::Success);
        assert_eq!(result.analysis.as_deref(), Some("摘要:第1章 好"));
        assert_eq!(result.chapter_title.as_deref(), Some("好"));

        let bad = ChapterRecord::new(2, None, "第2章 坏");
        let result = flow.run(&bad).await;
        assert_eq!(result.status, AnalysisStatus::Failed);
        assert_eq!(result.analysis, None);
        assert_eq!(result.error.as_deref(), Some("401 Unauthorized"));
    }
}
