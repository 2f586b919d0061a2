/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 TestBuddy 启动");
    info!("🌐 Bedrock 端点: {}", config.endpoint());
    info!(
        "💬 对话模型: {} (max_tokens: {})",
        config.chat_model_id, config.chat_max_tokens
    );
    info!(
        "📋 测试计划模型: {} (max_tokens: {})",
        config.test_plan_model_id, config.test_plan_max_tokens
    );
    info!("{}", "=".repeat(60));
}

/// 记录生成结果摘要
///
/// # 参数
/// - `structured`: 是否解析为结构化计划
/// - `test_cases`: 技术测试用例数量
/// - `warnings`: 提取失败的文件数量
pub fn log_generation_summary(structured: bool, test_cases: usize, warnings: usize) {
    info!("\n{}", "─".repeat(60));
    if structured {
        info!("✅ 测试计划生成完成: {} 个技术测试用例", test_cases);
    } else {
        info!("⚠️ 测试计划未能解析为 JSON，按原始文本输出");
    }
    if warnings > 0 {
        info!("⚠️ {} 个文件未能读取", warnings);
    }
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
