//! 学习会话 - 编排层
//!
//! ## 职责
//!
//! 持有 [`SessionState`]，把用户动作分发给流程层，并把错误转换成界面上的一条提示。
//! 每个动作处理完都返回一个 [`SessionView`]。
//!
//! ## 设计特点
//!
//! - 动作按顺序执行，同一时间只有一个动作修改状态
//! - 错误在这里终止，不会继续向界面层传播
//! - 每个动作开始时清掉上一次的错误提示

use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, ErrorKind};
use crate::infrastructure::TextExtractor;
use crate::models::{Document, QaPair};
use crate::orchestrator::view::SessionView;
use crate::services::CompletionService;
use crate::workflow::{SessionState, StudyFlow, Tab};

/// 学习会话
pub struct StudySession<C> {
    flow: StudyFlow<C>,
    extractor: TextExtractor,
    state: SessionState,
}

/// 导出文件内容
#[derive(Debug, Serialize)]
struct StudyExport<'a> {
    exported_at: String,
    summary: &'a str,
    paragraphs: &'a [String],
    paragraph_index: usize,
    questions: &'a [QaPair],
}

impl<C: CompletionService> StudySession<C> {
    pub fn new(llm: C, config: &Config) -> Self {
        Self {
            flow: StudyFlow::new(llm, config),
            extractor: TextExtractor::new(config),
            state: SessionState::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn flow(&self) -> &StudyFlow<C> {
        &self.flow
    }

    /// 当前状态的渲染快照
    pub fn view(&self) -> SessionView {
        SessionView::from_state(&self.state)
    }

    /// 提取文档文本，然后生成摘要并切分段落
    ///
    /// 提取失败时记录错误并停留在上传页，不会调用 LLM。
    pub async fn process_document(&mut self, document: Document) -> SessionView {
        self.state.last_error = None;

        match self.extractor.extract(document).await {
            Ok(text) => self.process_extracted(text).await,
            Err(e) => {
                self.record_error(&e);
                self.view()
            }
        }
    }

    /// 从文件加载文档并处理
    pub async fn process_file(&mut self, path: &Path) -> SessionView {
        self.state.last_error = None;

        match Document::from_path(path).await {
            Ok(document) => self.process_document(document).await,
            Err(e) => {
                self.record_error(&e);
                self.view()
            }
        }
    }

    /// 处理已经提取好的文本
    pub async fn process_text(&mut self, text: impl Into<String>) -> SessionView {
        self.state.last_error = None;
        self.process_extracted(text.into()).await
    }

    async fn process_extracted(&mut self, text: String) -> SessionView {
        if text.trim().is_empty() {
            error!("未能从文件中提取到文本");
            self.state.last_error = Some("未能从文件中提取到文本".to_string());
            return self.view();
        }

        self.state.start_document(text);
        let outcome = self.flow.run(&self.state.extracted_text).await;

        match outcome.summary {
            Ok(summary) => self.state.summary = summary,
            Err(e) => self.record_error(&e),
        }

        match outcome.paragraphs {
            Ok(paragraphs) => {
                self.state.paragraphs = paragraphs;
                self.state.paragraph_index = 0;
            }
            Err(e) => self.record_error(&e),
        }

        info!(
            "✓ 文档处理完成: 摘要 {} 个字符, {} 个段落",
            self.state.summary.chars().count(),
            self.state.paragraphs.len()
        );

        self.state.active_tab = Tab::Summary;
        self.view()
    }

    /// 清空文本、摘要、段落和题目，保留当前标签页
    pub fn clear(&mut self) -> SessionView {
        self.state.clear();
        info!("🧹 会话已清空");
        self.view()
    }

    pub fn switch_tab(&mut self, tab: Tab) -> SessionView {
        self.state.last_error = None;
        self.state.active_tab = tab;
        self.view()
    }

    pub fn next_paragraph(&mut self) -> SessionView {
        self.state.last_error = None;
        if !self.state.has_next() {
            return self.view().with_notice("已经是最后一个段落");
        }
        self.state.move_to(self.state.paragraph_index + 1);
        self.view()
    }

    pub fn previous_paragraph(&mut self) -> SessionView {
        self.state.last_error = None;
        if !self.state.has_previous() {
            return self.view().with_notice("已经是第一个段落");
        }
        self.state.move_to(self.state.paragraph_index - 1);
        self.view()
    }

    pub fn toggle_answers(&mut self) -> SessionView {
        self.state.last_error = None;
        self.state.show_answers = !self.state.show_answers;
        self.view()
    }

    /// 为当前段落生成题目，替换掉之前的题目
    pub async fn generate_questions(&mut self) -> SessionView {
        self.state.last_error = None;
        self.state.active_tab = Tab::Practice;

        let Some(paragraph) = self.state.current_paragraph().map(str::to_string) else {
            return self
                .view()
                .with_notice("没有可出题的内容，请先上传并处理文件");
        };

        match self.flow.generate_questions(&paragraph).await {
            Ok(questions) => {
                let empty = questions.is_empty();
                self.state.generated_questions = questions;
                if empty {
                    warn!("⚠️ 没有解析出任何题目");
                    return self.view().with_notice("没有解析出任何题目，请重试");
                }
            }
            Err(e) => {
                self.state.generated_questions.clear();
                self.record_error(&e);
            }
        }

        self.view()
    }

    /// 把摘要、段落和当前题目导出为 JSON
    pub async fn export_json(&mut self, path: &Path) -> SessionView {
        self.state.last_error = None;

        let export = StudyExport {
            exported_at: chrono::Local::now().to_rfc3339(),
            summary: &self.state.summary,
            paragraphs: &self.state.paragraphs,
            paragraph_index: self.state.paragraph_index,
            questions: &self.state.generated_questions,
        };

        let result = match serde_json::to_string_pretty(&export) {
            Ok(json) => tokio::fs::write(path, json)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(()) => {
                info!("💾 已导出到 {}", path.display());
                self.view()
                    .with_notice(format!("已导出到 {}", path.display()))
            }
            Err(e) => {
                error!("导出失败 ({}): {}", path.display(), e);
                self.state.last_error = Some(format!("导出失败: {}", e));
                self.view()
            }
        }
    }

    fn record_error(&mut self, err: &AppError) {
        error!("{} {}", self.state, err);
        self.state.last_error = Some(user_message(err));
    }
}

/// 把错误转换成给用户看的一句话
pub fn user_message(err: &AppError) -> String {
    match err.kind() {
        ErrorKind::Configuration => format!("API 配置失败，请检查 API 密钥 ({})", err),
        ErrorKind::Extraction => format!("文本提取失败: {}", err),
        ErrorKind::Service => match err.stage() {
            Some(_) => err.to_string(),
            None => format!("LLM 调用失败: {}", err),
        },
    }
}
