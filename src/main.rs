use anyhow::{Context, Result};
use clap::Parser;
use testbuddy::app::App;
use testbuddy::cli::Cli;
use testbuddy::config::Config;
use testbuddy::logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::load(cli.config.as_deref()).context("加载配置失败")?;

    // 初始化日志
    logger::init(cli.verbose || config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config)?.run(cli.command).await?;

    Ok(())
}
