//! # Novel Digest
//!
//! 把一部长篇小说切分成章节，再逐章调用外部分析服务，结果增量保存，
//! 失败的章节可以单独重试，最后把分析结果整合成阶段大纲。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 目录布局 `CorpusLayout`，小说名决定全部路径
//!
//! ### ② 业务能力层（Services）
//! - `numeral` - 中文数字转换
//! - `encoding` - 源文件编码检测与解码
//! - `segmenter` - 分章并写出章节文件
//! - `AnalysisService` / `LlmService` - 单章分析能力
//! - `ResultStore` - 分析结果的保存、读取与重写
//!
//! ### ③ 流程层（Workflow）
//! - `ChapterFlow` - 单章：调用分析服务，成功失败都收敛为一条结果
//!
//! ### ④ 编排层（Orchestration）
//! - `AnalysisOrchestrator` - 分批并发分析，分窗保存
//! - `RetryCoordinator` - 串行重试失败章节，整体重写结果
//! - `OutlineBuilder` - 分批并发把分析结果整合为阶段大纲
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AnalysisError, AppError, AppResult, ConfigError};
pub use infrastructure::CorpusLayout;
pub use models::{AnalysisResult, AnalysisStatus, ChapterRecord};
pub use orchestrator::{AnalysisOrchestrator, OutlineBuilder, RetryCoordinator};
pub use services::{AnalysisOutput, AnalysisService};
pub use workflow::ChapterFlow;
