//! 摘要服务 - 业务能力层
//!
//! 一次提示词往返，不做额外判断

use tracing::{debug, error, warn};

use crate::error::{AppResult, LlmError, Stage};
use crate::services::CompletionService;

/// 摘要服务
#[derive(Debug, Clone, Default)]
pub struct Summarizer;

impl Summarizer {
    pub fn new() -> Self {
        Self
    }

    /// 生成全文摘要
    ///
    /// 文本为空时直接返回空字符串，不调用 LLM。
    pub async fn summarize<C: CompletionService>(&self, llm: &C, text: &str) -> AppResult<String> {
        if text.trim().is_empty() {
            warn!("摘要输入为空，跳过");
            return Ok(String::new());
        }

        self.request_summary(llm, text).await.map_err(|e| {
            error!("生成摘要失败: {}", e);
            e.in_stage(Stage::Summary)
        })
    }

    async fn request_summary<C: CompletionService>(&self, llm: &C, text: &str) -> AppResult<String> {
        let prompt = build_summary_prompt(text);
        debug!("摘要提示词长度: {} 字符", prompt.len());

        let summary = llm.complete(&prompt).await?;
        if summary.trim().is_empty() {
            return Err(LlmError::BlankResponse.into());
        }

        Ok(summary)
    }
}

fn build_summary_prompt(text: &str) -> String {
    format!(
        r#"Please provide a comprehensive summary of the following text, capturing all key points:

{}

Your summary should:
1. Be well-structured and easy to understand
2. Maintain the original meaning and important details
3. Be between 10-20% of the original length
4. Use bullet points for main concepts where appropriate
"#,
        text
    )
}
