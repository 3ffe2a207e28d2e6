//! 失败重试 - 编排层
//!
//! 读回全部结构化结果，逐章重试失败的章节（串行、带间隔），
//! 最后按当前结果整体重写结果文件。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::CorpusLayout;
use crate::models::{find_chapter, AnalysisResult};
use crate::services::{AnalysisService, BatchKey, HeadingPattern, ResultStore};
use crate::utils::logging::print_final_stats;
use crate::workflow::ChapterFlow;

/// 重试参数
#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    /// 重写时的窗口大小
    pub merge_size: usize,
    /// 两次重试之间的等待
    pub retry_delay: Duration,
}

impl RetryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            merge_size: config.merge_size,
            retry_delay: config.retry_delay(),
        }
    }
}

/// 重试统计
#[derive(Debug, Default)]
pub struct RetrySummary {
    pub attempted: usize,
    pub recovered: usize,
    pub still_failed: usize,
    /// 重写后的结果文件，没有失败章节时为空
    pub batches: Vec<BatchKey>,
}

/// 失败重试协调器
pub struct RetryCoordinator {
    flow: ChapterFlow,
    store: ResultStore,
    chapters_dir: PathBuf,
    pattern: HeadingPattern,
    options: RetryOptions,
}

impl RetryCoordinator {
    pub fn new(
        service: Arc<dyn AnalysisService>,
        layout: &CorpusLayout,
        pattern: HeadingPattern,
        options: RetryOptions,
    ) -> Self {
        Self {
            flow: ChapterFlow::new(service),
            store: ResultStore::new(layout.detail_dir()),
            chapters_dir: layout.chapters_dir(),
            pattern,
            options,
        }
    }

    pub async fn run(&self) -> AppResult<RetrySummary> {
        info!("开始重试失败的章节...");

        let mut all_results = self.store.load_all()?;
        let failed: Vec<u32> = all_results
            .iter()
            .filter(|r| r.is_failed())
            .map(|r| r.chapter_number)
            .collect();

        if failed.is_empty() {
            info!("没有发现失败的章节，无需重试。");
            return Ok(RetrySummary::default());
        }

        info!("发现 {} 个失败的章节，开始重试...", failed.len());

        // 先确认章节文件齐全，缺文件时不发起任何请求
        let chapters = failed
            .iter()
            .map(|&number| find_chapter(&self.chapters_dir, number, &self.pattern))
            .collect::<AppResult<Vec<_>>>()?;

        let mut summary = RetrySummary {
            attempted: chapters.len(),
            ..Default::default()
        };

        for (i, chapter) in chapters.iter().enumerate() {
            if i > 0 && !self.options.retry_delay.is_zero() {
                tokio::time::sleep(self.options.retry_delay).await;
            }

            info!("正在重试第 {} 章...", chapter.number());
            let result = self.flow.run(chapter).await;
            if result.is_failed() {
                summary.still_failed += 1;
            } else {
                summary.recovered += 1;
            }
            replace(&mut all_results, result);
        }

        info!("正在重新生成结果文件...");
        summary.batches = self.store.rewrite(&all_results, self.options.merge_size)?;

        print_final_stats("失败重试", summary.recovered, summary.still_failed, self.store.dir());

        Ok(summary)
    }
}

/// 整条替换同一章的结果
fn replace(results: &mut [AnalysisResult], result: AnalysisResult) {
    if let Some(slot) = results
        .iter_mut()
        .find(|r| r.chapter_number == result.chapter_number)
    {
        *slot = result;
    }
}
