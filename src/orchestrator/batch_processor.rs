//! 批量章节分析器 - 编排层
//!
//! ## 职责
//!
//! 1. **分批处理**：把章节按 `batch_size` 分组，组内并发、组间串行
//! 2. **失败隔离**：单章失败只记录为失败结果，不影响同组其他章节
//! 3. **分窗保存**：累计达到 `merge_size` 或最后一组时保存一次
//! 4. **限速**：组与组之间固定等待
//! 5. **出错兜底**：组内出现无法捕获的异常时先保存已有结果再返回错误

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::CorpusLayout;
use crate::models::{AnalysisResult, ChapterRecord};
use crate::services::{AnalysisService, BatchKey, ResultStore};
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_chapters_loaded, print_final_stats,
};
use crate::workflow::ChapterFlow;

/// 批处理参数
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// 每组并发章节数
    pub batch_size: usize,
    /// 累计多少条结果保存一次
    pub merge_size: usize,
    /// 组间等待
    pub batch_delay: Duration,
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            merge_size: config.merge_size,
            batch_delay: config.batch_delay(),
        }
    }
}

/// 一次完整运行的结果
#[derive(Debug, Default)]
pub struct RunSummary {
    /// 实际执行的并发组数量
    pub groups: usize,
    /// 按运行顺序排列的全部结果
    pub results: Vec<AnalysisResult>,
    /// 本次写出的结果文件
    pub batches: Vec<BatchKey>,
}

impl RunSummary {
    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_failed()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }
}

/// 一组的处理结果
pub(crate) struct GroupOutcome {
    pub(crate) results: Vec<AnalysisResult>,
    /// 组内任务异常退出的原因
    pub(crate) aborted: Option<String>,
}

/// 批量章节分析器
pub struct AnalysisOrchestrator {
    flow: ChapterFlow,
    store: ResultStore,
    options: BatchOptions,
}

impl AnalysisOrchestrator {
    pub fn new(service: Arc<dyn AnalysisService>, layout: &CorpusLayout, options: BatchOptions) -> Self {
        Self {
            flow: ChapterFlow::new(service),
            store: ResultStore::new(layout.detail_dir()),
            options,
        }
    }

    /// 分析全部章节，每章恰好处理一次
    pub async fn run(&self, chapters: Vec<ChapterRecord>) -> AppResult<RunSummary> {
        self.store.ensure_dir()?;

        let batch_size = self.options.batch_size.max(1);
        let merge_size = self.options.merge_size.max(1);
        let chapters: Vec<Arc<ChapterRecord>> = chapters.into_iter().map(Arc::new).collect();
        let total_batches = chapters.len().div_ceil(batch_size);

        log_chapters_loaded(chapters.len(), batch_size, merge_size);

        let mut summary = RunSummary::default();
        let mut unsaved = 0usize;

        for (idx, group) in chapters.chunks(batch_size).enumerate() {
            let batch_num = idx + 1;
            let is_last = batch_num == total_batches;
            let first = group[0].number();
            let last = group[group.len() - 1].number();

            log_batch_start(batch_num, total_batches, first, last);

            let outcome = process_group(&self.flow, group).await;
            summary.groups += 1;
            unsaved += outcome.results.len();
            let success = outcome.results.iter().filter(|r| !r.is_failed()).count();
            let finished = outcome.results.len();
            summary.results.extend(outcome.results);

            if let Some(reason) = outcome.aborted {
                error!("处理第 {} 到 {} 章时出错: {}", first, last, reason);
                self.save_on_error(&summary.results);
                return Err(AppError::GroupAborted { first, last, reason });
            }

            log_batch_complete(batch_num, success, finished);

            if unsaved >= merge_size || is_last {
                let window = &summary.results[summary.results.len() - unsaved..];
                info!(
                    "正在保存第 {} 到 {} 章的分析结果...",
                    window[0].chapter_number,
                    window[window.len() - 1].chapter_number
                );
                let key = self.store.write_window(window, summary.batches.len() + 1)?;
                summary.batches.push(key);
                unsaved = 0;
            }

            if !is_last && !self.options.batch_delay.is_zero() {
                info!("等待 {} 毫秒以避免并发限制...", self.options.batch_delay.as_millis());
                tokio::time::sleep(self.options.batch_delay).await;
            }
        }

        print_final_stats(
            "章节分析",
            summary.success_count(),
            summary.failed_count(),
            self.store.dir(),
        );

        Ok(summary)
    }

    /// 保存本次运行已累积的全部结果，失败只记录日志
    fn save_on_error(&self, results: &[AnalysisResult]) {
        if results.is_empty() {
            return;
        }
        if let Err(e) = self.store.write_error_save(results) {
            error!("保存出错前的结果失败: {}", e);
        }
    }
}

/// 组内并发，等待全部任务结束后再返回
pub(crate) async fn process_group(flow: &ChapterFlow, group: &[Arc<ChapterRecord>]) -> GroupOutcome {
    let handles: Vec<_> = group
        .iter()
        .map(|chapter| {
            let flow = flow.clone();
            let chapter = Arc::clone(chapter);
            tokio::spawn(async move { flow.run(&chapter).await })
        })
        .collect();

    let mut outcome = GroupOutcome {
        results: Vec::with_capacity(group.len()),
        aborted: None,
    };

    for (chapter, joined) in group.iter().zip(join_all(handles).await) {
        match joined {
            Ok(result) => outcome.results.push(result),
            Err(e) => {
                error!("[第{}章] 任务执行失败: {}", chapter.number(), e);
                outcome
                    .aborted
                    .get_or_insert_with(|| format!("第{}章任务异常退出: {}", chapter.number(), e));
            }
        }
    }

    outcome
}
