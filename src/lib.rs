//! # DOC-SUM
//!
//! 一个学习辅助工具：上传 PDF 或图片，提取文本，让 LLM 生成摘要，
//! 把全文切成段落，再逐段生成问答题用于练习。
//!
//! ## 架构设计
//!
//! 本系统沿用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `TextExtractor` - PDF 按页提取 / tesseract OCR
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，每次只处理一段输入
//! - `LlmService` - `CompletionService` 的 LLM 实现
//! - `Summarizer` - 全文摘要
//! - `ParagraphSegmenter` - 段落切分（空行 → LLM → 句子分组）
//! - `QuestionGenerator` - 单段出题与回复解析
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份文档"的处理流程
//! - `StudyFlow` - 流程编排（摘要 → 切段 → 出题）
//! - `SessionState` - 显式的会话状态
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/study_session` - 处理用户动作，持有会话状态
//! - `orchestrator/view` - 每个动作返回的渲染快照
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind, Stage};
pub use infrastructure::TextExtractor;
pub use models::{Document, MediaType, QaPair};
pub use orchestrator::{SessionView, StudySession};
pub use services::{
    parse_qa_response, CompletionService, LlmService, ParagraphSegmenter, QuestionGenerator,
    Summarizer,
};
pub use workflow::{SessionState, StudyFlow, Tab};
