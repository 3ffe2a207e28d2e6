//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量章节分析器
//! - 按批次并发分析章节（组内并发，组间串行）
//! - 累计到窗口大小时保存结果
//! - 组间固定等待，作为唯一的限速手段
//!
//! ### `retry_processor` - 失败重试
//! - 读回全部结果，串行重试失败章节
//! - 按当前结果重新分窗并重写全部文件
//!
//! ### `outline_processor` - 阶段大纲
//! - 读取分析结果的可读版，分批并发生成大纲
//! - 与批量分析共用组内并发逻辑
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor / retry_processor / outline_processor (处理 Vec<ChapterRecord>)
//!     ↓
//! workflow::ChapterFlow (处理单个章节)
//!     ↓
//! services (能力层：analysis / result_store)
//!     ↓
//! infrastructure (目录布局)
//! ```

pub mod batch_processor;
pub mod outline_processor;
pub mod retry_processor;

// 重新导出主要类型
pub use batch_processor::{AnalysisOrchestrator, BatchOptions, RunSummary};
pub use outline_processor::{OutlineBuilder, OutlineOptions, OutlineSummary};
pub use retry_processor::{RetryCoordinator, RetryOptions, RetrySummary};
