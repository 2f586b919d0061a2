//! 命令行参数
//!
//! 只负责解析，具体执行在 `app` 中

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::presentation::TestCaseKey;

#[derive(Parser, Debug)]
#[command(
    name = "testbuddy",
    version,
    about = "根据需求文档生成结构化测试计划"
)]
pub struct Cli {
    /// TOML 配置文件路径
    #[arg(long, global = true, env = "TESTBUDDY_CONFIG")]
    pub config: Option<PathBuf>,

    /// 输出 debug 日志
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 启动 HTTP 服务
    Serve,
    /// 生成测试计划
    Generate(GenerateArgs),
    /// 单次对话
    Chat {
        /// 提示词
        prompt: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// 需求文档文本
    #[arg(long)]
    pub feature_document: Option<String>,

    /// 附加文本输入，可重复
    #[arg(long = "text")]
    pub texts: Vec<String>,

    /// 上传文件（PDF / DOCX / TXT），可重复
    #[arg(long = "file")]
    pub files: Vec<PathBuf>,

    /// 输出 JSON 而不是渲染后的文本
    #[arg(long)]
    pub json: bool,

    /// 标记已完成的用例，格式 `分组名:序号`，可重复
    #[arg(long = "done", value_name = "SECTION:INDEX")]
    pub done: Vec<TestCaseKey>,

    /// 展开指定分组的用例详情，可重复
    #[arg(long = "expand", value_name = "SECTION")]
    pub expand: Vec<String>,

    /// 展开全部分组
    #[arg(long, conflicts_with = "expand")]
    pub expand_all: bool,
}
