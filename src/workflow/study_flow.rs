//! 文档学习流程 - 流程层
//!
//! 核心职责：定义"一份文档"的处理流程
//!
//! 流程顺序：
//! 1. 全文 → 摘要
//! 2. 全文 → 段落
//! 3. 段落 → 题目（按需，每次只处理当前段落）

use tracing::{info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::QaPair;
use crate::services::{CompletionService, ParagraphSegmenter, QuestionGenerator, Summarizer};
use crate::utils::truncate_text;

/// 一份文档的处理结果
///
/// 摘要和段落互不影响，任何一步失败都单独保留错误
#[derive(Debug)]
pub struct DocumentOutcome {
    pub summary: AppResult<String>,
    pub paragraphs: AppResult<Vec<String>>,
}

/// 文档学习流程
///
/// - 编排摘要、切段、出题三个能力
/// - 所有调用按顺序执行，同一时间最多一个 LLM 请求
/// - 不持有界面状态
pub struct StudyFlow<C> {
    llm: C,
    summarizer: Summarizer,
    segmenter: ParagraphSegmenter,
    generator: QuestionGenerator,
}

impl<C: CompletionService> StudyFlow<C> {
    pub fn new(llm: C, config: &Config) -> Self {
        Self {
            llm,
            summarizer: Summarizer::new(),
            segmenter: ParagraphSegmenter::new(config),
            generator: QuestionGenerator::new(config),
        }
    }

    pub fn llm(&self) -> &C {
        &self.llm
    }

    /// 处理新提取出的全文：先摘要，再切段
    pub async fn run(&self, text: &str) -> DocumentOutcome {
        info!("📝 文档预览: {}", truncate_text(text.trim(), 80));

        info!("🤖 正在生成摘要...");
        let summary = self.summarize(text).await;

        info!("✂️ 正在切分段落...");
        let paragraphs = self.split_paragraphs(text).await;

        DocumentOutcome {
            summary,
            paragraphs,
        }
    }

    pub async fn summarize(&self, text: &str) -> AppResult<String> {
        self.summarizer.summarize(&self.llm, text).await
    }

    pub async fn split_paragraphs(&self, text: &str) -> AppResult<Vec<String>> {
        let paragraphs = self.segmenter.segment(&self.llm, text).await?;
        if paragraphs.is_empty() {
            warn!("⚠️ 没有得到任何段落");
        } else {
            info!("✓ 得到 {} 个段落", paragraphs.len());
        }
        Ok(paragraphs)
    }

    pub async fn generate_questions(&self, paragraph: &str) -> AppResult<Vec<QaPair>> {
        info!("❓ 正在为段落出题: {}", truncate_text(paragraph.trim(), 60));
        self.generator.generate(&self.llm, paragraph).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Stage;
    use crate::services::test_support::ScriptedCompletion;

    #[tokio::test]
    async fn test_run_summarizes_then_splits() {
        let llm = ScriptedCompletion::new(&["The summary.", "P1.\n\nP2.\n\nP3."]);
        let flow = StudyFlow::new(llm, &Config::default());

        let outcome = flow.run("A single block of text.").await;

        assert_eq!(outcome.summary.unwrap(), "The summary.");
        assert_eq!(outcome.paragraphs.unwrap(), vec!["P1.", "P2.", "P3."]);
        let prompts = flow.llm().prompts();
        assert!(prompts[0].contains("comprehensive summary"));
        assert!(prompts[1].contains("5-10 meaningful"));
    }

    #[tokio::test]
    async fn test_summary_failure_does_not_stop_split() {
        // 摘要拿到空白回复
        let llm = ScriptedCompletion::new(&["  ", "P1.\n\nP2.\n\nP3."]);
        let flow = StudyFlow::new(llm, &Config::default());

        let outcome = flow.run("A single block of text.").await;

        assert_eq!(outcome.summary.unwrap_err().stage(), Some(Stage::Summary));
        assert_eq!(outcome.paragraphs.unwrap().len(), 3);
    }
}
