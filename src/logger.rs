//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 安装全局日志订阅器，默认级别 `info`，可用 `RUST_LOG` 覆盖
///
/// 重复调用是安全的，后续调用不生效。
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
