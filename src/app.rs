//! 四个阶段的入口：分章、分析、重试、大纲

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::CorpusLayout;
use crate::models::{load_chapters, load_digests};
use crate::orchestrator::{
    AnalysisOrchestrator, BatchOptions, OutlineBuilder, OutlineOptions, OutlineSummary,
    RetryCoordinator, RetryOptions, RetrySummary, RunSummary,
};
use crate::services::{
    AnalysisService, ChapterSegmenter, HeadingPattern, LlmService, SegmentOptions, SegmentReport,
};

/// 应用主结构
///
/// 持有配置和分析服务，小说名在每次调用时显式传入
pub struct App {
    config: Config,
    pattern: HeadingPattern,
    service: Arc<dyn AnalysisService>,
    /// 大纲阶段使用的服务，默认与单章分析相同
    outline_service: Arc<dyn AnalysisService>,
}

impl App {
    /// 使用指定的分析服务创建
    pub fn new(config: Config, service: Arc<dyn AnalysisService>) -> AppResult<Self> {
        config.validate()?;
        let pattern = HeadingPattern::new(&config.heading_markers)?;
        Ok(Self {
            config,
            pattern,
            outline_service: Arc::clone(&service),
            service,
        })
    }

    /// 替换大纲阶段使用的服务
    pub fn with_outline_service(mut self, service: Arc<dyn AnalysisService>) -> Self {
        self.outline_service = service;
        self
    }

    /// 使用兼容 OpenAI 接口的 LLM 服务创建
    pub fn with_llm(config: Config) -> AppResult<Self> {
        let service: Arc<dyn AnalysisService> = Arc::new(LlmService::new(&config));
        let outline: Arc<dyn AnalysisService> = Arc::new(LlmService::outline(&config));
        Ok(Self::new(config, service)?.with_outline_service(outline))
    }

    fn layout(&self, name: &str) -> CorpusLayout {
        CorpusLayout::new(&self.config.root_dir, name)
    }

    /// 分章：`novel/<name>.txt` → `data/<name>/chapters/`
    pub fn split(&self, name: &str) -> AppResult<SegmentReport> {
        let options = SegmentOptions {
            encoding: self.config.encoding_choice()?,
            volume_mode: self.config.volume_mode,
        };
        ChapterSegmenter::new(self.pattern.clone(), options).split_chapters(&self.layout(name))
    }

    /// 分析：`data/<name>/chapters/` → `data/<name>/detail/`
    pub async fn read(&self, name: &str) -> AppResult<RunSummary> {
        let layout = self.layout(name);
        info!("📁 加载章节文件: {}", layout.chapters_dir().display());
        let chapters = load_chapters(&layout.chapters_dir(), &self.pattern)?;

        let orchestrator = AnalysisOrchestrator::new(
            Arc::clone(&self.service),
            &layout,
            BatchOptions::from_config(&self.config),
        );
        orchestrator.run(chapters).await
    }

    /// 重试 `data/<name>/detail/` 中失败的章节
    pub async fn retry(&self, name: &str) -> AppResult<RetrySummary> {
        let coordinator = RetryCoordinator::new(
            Arc::clone(&self.service),
            &self.layout(name),
            self.pattern.clone(),
            RetryOptions::from_config(&self.config),
        );
        coordinator.run().await
    }

    /// 大纲：`data/<name>/detail/<n>.txt` → `data/<name>/outline/`
    pub async fn outline(&self, name: &str) -> AppResult<OutlineSummary> {
        let layout = self.layout(name);
        info!("📁 加载章纲文件: {}", layout.detail_dir().display());
        let digests = load_digests(&layout.detail_dir())?;

        let builder = OutlineBuilder::new(
            Arc::clone(&self.outline_service),
            &layout,
            OutlineOptions::from_config(&self.config),
        );
        builder.run(digests).await
    }
}
