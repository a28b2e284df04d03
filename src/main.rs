use anyhow::Result;
use clap::Parser;
use doc_sum::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();

    // 加载配置、初始化日志并进入交互循环
    cli::run(cli).await
}
