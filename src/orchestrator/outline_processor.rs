//! 阶段大纲生成 - 编排层
//!
//! 读取 `detail/<n>.txt`，分批并发生成大纲，组间固定等待。
//! 成功的大纲按完成顺序编号写入 `outline/<序号>.txt`，失败的只记录日志。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::CorpusLayout;
use crate::models::ChapterRecord;
use crate::orchestrator::batch_processor::process_group;
use crate::services::AnalysisService;
use crate::utils::logging::{log_batch_complete, log_batch_start, print_final_stats};
use crate::workflow::ChapterFlow;

/// 大纲生成参数
#[derive(Debug, Clone, Copy)]
pub struct OutlineOptions {
    /// 每组并发的章纲数量
    pub batch_size: usize,
    /// 组间等待
    pub batch_delay: Duration,
}

impl OutlineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.outline_batch_size,
            batch_delay: config.batch_delay(),
        }
    }
}

/// 大纲生成统计
#[derive(Debug, Default)]
pub struct OutlineSummary {
    pub groups: usize,
    /// 写出的大纲文件，按序号排列
    pub written: Vec<PathBuf>,
    /// 生成失败的章纲序号
    pub failed: Vec<u32>,
}

/// 阶段大纲生成器
pub struct OutlineBuilder {
    flow: ChapterFlow,
    output_dir: PathBuf,
    options: OutlineOptions,
}

impl OutlineBuilder {
    pub fn new(service: Arc<dyn AnalysisService>, layout: &CorpusLayout, options: OutlineOptions) -> Self {
        Self {
            flow: ChapterFlow::new(service),
            output_dir: layout.outline_dir(),
            options,
        }
    }

    pub async fn run(&self, digests: Vec<ChapterRecord>) -> AppResult<OutlineSummary> {
        self.prepare_output_dir()?;

        let batch_size = self.options.batch_size.max(1);
        let digests: Vec<Arc<ChapterRecord>> = digests.into_iter().map(Arc::new).collect();
        let total_batches = digests.len().div_ceil(batch_size);
        info!("✓ 共 {} 份章纲，每批并发 {} 份", digests.len(), batch_size);

        let mut summary = OutlineSummary::default();

        for (idx, group) in digests.chunks(batch_size).enumerate() {
            let batch_num = idx + 1;
            let is_last = batch_num == total_batches;
            let first = group[0].number();
            let last = group[group.len() - 1].number();

            log_batch_start(batch_num, total_batches, first, last);

            let outcome = process_group(&self.flow, group).await;
            summary.groups += 1;

            let mut success = 0;
            let finished = outcome.results.len();
            for result in outcome.results {
                match result.analysis.as_deref().filter(|_| !result.is_failed()) {
                    Some(outline) => {
                        let path = self.output_dir.join(format!("{}.txt", summary.written.len() + 1));
                        fs::write(&path, outline.trim()).map_err(|e| AppError::persistence(&path, e))?;
                        info!("已保存大纲: {}", path.display());
                        summary.written.push(path);
                        success += 1;
                    }
                    None => {
                        warn!(
                            "第 {} 份章纲生成大纲失败: {}",
                            result.chapter_number,
                            result.error.as_deref().unwrap_or("未知错误")
                        );
                        summary.failed.push(result.chapter_number);
                    }
                }
            }

            if let Some(reason) = outcome.aborted {
                error!("处理第 {} 到 {} 份章纲时出错: {}", first, last, reason);
                return Err(AppError::GroupAborted { first, last, reason });
            }

            log_batch_complete(batch_num, success, finished);

            if !is_last && !self.options.batch_delay.is_zero() {
                info!("等待 {} 毫秒以避免并发限制...", self.options.batch_delay.as_millis());
                tokio::time::sleep(self.options.batch_delay).await;
            }
        }

        print_final_stats(
            "大纲生成",
            summary.written.len(),
            summary.failed.len(),
            &self.output_dir,
        );

        Ok(summary)
    }

    /// 创建输出目录并清掉上一次运行留下的大纲
    fn prepare_output_dir(&self) -> AppResult<()> {
        let dir: &Path = &self.output_dir;
        fs::create_dir_all(dir).map_err(|e| AppError::persistence(dir, e))?;

        let entries = fs::read_dir(dir).map_err(|e| AppError::persistence(dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| AppError::persistence(dir, e))?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("txt") {
                fs::remove_file(&path).map_err(|e| AppError::persistence(&path, e))?;
            }
        }
        Ok(())
    }
}
