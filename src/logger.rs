//! 日志初始化
//!
//! `RUST_LOG` 优先；未设置时默认只输出本 crate 的 info 日志，
//! verbose 模式下为 debug。

use tracing_subscriber::EnvFilter;

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "testbuddy=debug"
    } else {
        "testbuddy=info"
    }
}

/// 初始化全局日志订阅者（重复调用时忽略）
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
