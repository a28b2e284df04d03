//! 命令行界面
//!
//! 解析启动参数，然后在终端里逐行读取命令，每条命令对应会话的一个动作

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::Config;
use crate::orchestrator::{SessionView, StudySession};
use crate::services::{CompletionService, LlmService};
use crate::utils::logging;
use crate::workflow::Tab;

/// DOC-SUM：上传文档，生成摘要，逐段练习问答
#[derive(Parser, Debug)]
#[command(name = "doc_sum", version, about)]
pub struct Cli {
    /// 启动后立即处理的 PDF 或图片
    pub file: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 模型名称（覆盖 MODEL）
    #[arg(long)]
    pub model: Option<String>,

    /// 最多保留的段落数
    #[arg(long)]
    pub max_paragraphs: Option<usize>,

    /// 每段生成的题目数量
    #[arg(long)]
    pub questions: Option<usize>,

    /// 同一道题出现多个答案行时报错
    #[arg(long)]
    pub strict: bool,

    /// 显示详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// 命令行参数覆盖配置
    pub fn apply(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.llm_model_name = model.clone();
        }
        if let Some(max) = self.max_paragraphs {
            config.max_paragraphs = max;
        }
        if let Some(questions) = self.questions {
            config.questions_per_paragraph = questions;
        }
        if self.strict {
            config.strict_answer_parsing = true;
        }
        if self.verbose {
            config.verbose_logging = true;
        }
    }
}

/// 交互命令
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload(PathBuf),
    Tab(Tab),
    Next,
    Previous,
    Generate,
    Answers,
    Clear,
    Export(PathBuf),
    Help,
    Quit,
}

impl Command {
    /// 解析一行输入；空行返回 `Ok(None)`
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "upload" | "u" if arg.is_empty() => Command::Tab(Tab::Upload),
            "upload-tab" => Command::Tab(Tab::Upload),
            "upload" | "u" => Command::Upload(PathBuf::from(arg)),
            "summary" | "s" => Command::Tab(Tab::Summary),
            "practice" | "p" => Command::Tab(Tab::Practice),
            "next" | "n" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "gen" | "generate" | "g" => Command::Generate,
            "answers" | "a" => Command::Answers,
            "clear" => Command::Clear,
            "export" if arg.is_empty() => return Err("用法: export <路径>".to_string()),
            "export" => Command::Export(PathBuf::from(arg)),
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("未知命令: {}，输入 help 查看帮助", other)),
        };

        Ok(Some(command))
    }
}

/// 执行一条命令
pub async fn dispatch<C: CompletionService>(
    session: &mut StudySession<C>,
    command: Command,
) -> Option<SessionView> {
    let view = match command {
        Command::Upload(path) => session.process_file(&path).await,
        Command::Tab(tab) => session.switch_tab(tab),
        Command::Next => session.next_paragraph(),
        Command::Previous => session.previous_paragraph(),
        Command::Generate => session.generate_questions().await,
        Command::Answers => session.toggle_answers(),
        Command::Clear => session.clear(),
        Command::Export(path) => session.export_json(&path).await,
        Command::Help | Command::Quit => return None,
    };
    Some(view)
}

/// 运行命令行程序
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("加载配置失败")?;
    cli.apply(&mut config);

    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    let llm = LlmService::new(&config);
    let mut session = StudySession::new(llm, &config);

    let first_view = match &cli.file {
        Some(path) => session.process_file(path).await,
        None => session.view(),
    };
    println!("{}", first_view);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => print_help(),
            Ok(Some(command)) => {
                if let Some(view) = dispatch(&mut session, command).await {
                    println!("{}", view);
                }
            }
            Err(message) => println!("❓ {}", message),
        }
    }

    info!("👋 再见");
    Ok(())
}

fn print_help() {
    println!("命令:");
    println!("  upload <路径>   处理 PDF 或图片 (不带路径则切到上传页)");
    println!("  upload-tab      切到上传页");
    println!("  summary         查看摘要");
    println!("  practice        练习题");
    println!("  next / prev     下一段 / 上一段");
    println!("  gen             为当前段落生成题目");
    println!("  answers         显示/隐藏答案");
    println!("  clear           清空当前文档");
    println!("  export <路径>   导出为 JSON");
    println!("  quit            退出");
}
