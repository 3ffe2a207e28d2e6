/// 日志工具模块
///
/// 提供批次进度与统计输出的辅助函数
use tracing::info;

/// 记录分析开始信息
///
/// # 参数
/// - `total`: 章节总数
/// - `batch_size`: 每批并发数
/// - `merge_size`: 保存窗口大小
pub fn log_chapters_loaded(total: usize, batch_size: usize, merge_size: usize) {
    info!("✓ 共找到 {} 个章节，开始批量分析", total);
    info!("📋 每批并发 {} 章，每累计 {} 章保存一次", batch_size, merge_size);
}

/// 记录批次开始信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `first`: 本批首章章节号
/// - `last`: 本批末章章节号
pub fn log_batch_start(batch_num: usize, total_batches: usize, first: u32, last: u32) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 正在分析章节 {} 到 {}", first, last);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `title`: 阶段名称
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `output_dir`: 结果目录
pub fn print_final_stats(title: &str, success: usize, failed: usize, output_dir: &std::path::Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 {}完成统计", title);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, success + failed);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_dir.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符数）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    let flat: String = text.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();
    if flat.chars().count() > max_len {
        flat.chars().take(max_len).collect::<String>() + "..."
    } else {
        flat
    }
}
