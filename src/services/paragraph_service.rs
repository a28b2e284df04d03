//! 段落切分服务 - 业务能力层
//!
//! 把提取出的整段文本切成有限个、有顺序的段落，供逐段出题使用。
//!
//! ## 切分顺序
//! 1. 按空行直接切分，数量合适时直接使用（不调用 LLM）
//! 2. 段落过多：让 LLM 重新组织成 `max_paragraphs` 段
//! 3. 段落过少：让 LLM 拆成 5-10 段
//! 4. 兜底：按句号把句子累积成不超过固定长度的段落
//!
//! 无论哪一步产出结果，最后都截断到 `max_paragraphs` 段。

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, Stage};
use crate::services::CompletionService;

/// 空行（允许只含空格/制表符的行），不吃掉下一段开头的缩进
static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("valid blank line regex"));

/// 段落切分服务
#[derive(Debug, Clone)]
pub struct ParagraphSegmenter {
    max_paragraphs: usize,
    min_direct_paragraphs: usize,
    fallback_chars: usize,
}

impl ParagraphSegmenter {
    pub fn new(config: &Config) -> Self {
        Self {
            max_paragraphs: config.max_paragraphs,
            min_direct_paragraphs: config.min_direct_paragraphs,
            fallback_chars: config.fallback_paragraph_chars,
        }
    }

    pub fn max_paragraphs(&self) -> usize {
        self.max_paragraphs
    }

    /// 使用配置的段落上限切分
    pub async fn segment<C: CompletionService>(&self, llm: &C, text: &str) -> AppResult<Vec<String>> {
        self.segment_with_limit(llm, text, self.max_paragraphs).await
    }

    /// 切分文本，最多返回 `max_paragraphs` 段
    ///
    /// LLM 调用失败时整体返回一个 [`Stage::Paragraphs`] 错误，不重试。
    pub async fn segment_with_limit<C: CompletionService>(
        &self,
        llm: &C,
        text: &str,
        max_paragraphs: usize,
    ) -> AppResult<Vec<String>> {
        if text.trim().is_empty() {
            warn!("段落切分输入为空，跳过");
            return Ok(Vec::new());
        }

        let paragraphs = self
            .run_tiers(llm, text, max_paragraphs)
            .await
            .map_err(|e| {
                error!("段落切分失败: {}", e);
                e.in_stage(Stage::Paragraphs)
            })?;

        Ok(truncate(paragraphs, max_paragraphs))
    }

    async fn run_tiers<C: CompletionService>(
        &self,
        llm: &C,
        text: &str,
        max_paragraphs: usize,
    ) -> AppResult<Vec<String>> {
        let direct = split_blank_lines(text);
        let count = direct.len();
        debug!("按空行切分得到 {} 段", count);

        if count >= self.min_direct_paragraphs && count <= max_paragraphs {
            info!("✓ 文档已有 {} 个段落，直接使用", count);
            return Ok(direct);
        }

        if count > max_paragraphs {
            info!(
                "🤖 段落过多 ({} > {})，请求 LLM 重新组织",
                count, max_paragraphs
            );
            let prompt = build_reorganize_prompt(text, max_paragraphs);
            let reorganized = request_paragraphs(llm, &prompt).await?;
            if !reorganized.is_empty() {
                return Ok(reorganized);
            }
            warn!("LLM 没有返回可用段落");
        }

        if count < self.min_direct_paragraphs {
            info!("🤖 段落过少 ({})，请求 LLM 拆分", count);
            let split = request_paragraphs(llm, &build_split_prompt(text)).await?;
            if !split.is_empty() {
                return Ok(split);
            }
            warn!("LLM 没有返回可用段落，改为按句子分组");

            let grouped = group_sentences(text, self.fallback_chars);
            if !grouped.is_empty() {
                return Ok(grouped);
            }
        }

        Ok(direct)
    }
}

async fn request_paragraphs<C: CompletionService>(llm: &C, prompt: &str) -> AppResult<Vec<String>> {
    debug!("段落提示词长度: {} 字符", prompt.len());
    let response = llm.complete(prompt).await?;
    Ok(split_blank_lines(&response))
}

/// 按空行切分，丢弃去除空白后为空的片段，保留原文
pub fn split_blank_lines(text: &str) -> Vec<String> {
    BLANK_LINE
        .split(text)
        .filter(|p| !p.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// 按句号切句，再累积成不超过 `max_chars` 个字符的段落
///
/// 单个超长句子独占一段。
pub fn group_sentences(text: &str, max_chars: usize) -> Vec<String> {
    let flattened = text.replace('\n', " ");
    let sentences = flattened
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}.", s));

    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        if !current.is_empty()
            && current.chars().count() + sentence.chars().count() > max_chars
        {
            paragraphs.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

fn truncate(mut paragraphs: Vec<String>, max_paragraphs: usize) -> Vec<String> {
    paragraphs.truncate(max_paragraphs);
    paragraphs
}

fn build_reorganize_prompt(text: &str, max_paragraphs: usize) -> String {
    format!(
        r#"Please reorganize the following text into {} meaningful, well-structured paragraphs:

{}

Each paragraph should:
1. Cover a specific topic or idea
2. Be logically connected to the previous and next paragraphs
3. Be a reasonable length (not too short, not too long)

Separate paragraphs with a single blank line and return only the paragraphs.
"#,
        max_paragraphs, text
    )
}

fn build_split_prompt(text: &str) -> String {
    format!(
        r#"Please split the following text into 5-10 meaningful, well-structured paragraphs:

{}

Each paragraph should:
1. Cover a specific topic or idea
2. Be logically connected to the previous and next paragraphs
3. Be a reasonable length (not too short, not too long)

Separate paragraphs with a single blank line and return only the paragraphs.
"#,
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::test_support::ScriptedCompletion;

    fn segmenter() -> ParagraphSegmenter {
        ParagraphSegmenter::new(&Config::default())
    }

    fn numbered_paragraphs(n: usize) -> String {
        (1..=n)
            .map(|i| format!("Paragraph number {} talks about topic {}.", i, i))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn test_split_blank_lines() {
        let parts = split_blank_lines("first\n\nsecond\n \t\nthird\n\n\n\n");
        assert_eq!(parts, vec!["first", "second", "third"]);

        // 单个换行不算段落边界
        assert_eq!(split_blank_lines("line one\nline two"), vec!["line one\nline two"]);
        assert_eq!(split_blank_lines("a\r\n\r\nb"), vec!["a", "b"]);
        assert!(split_blank_lines("\n\n  \n\n").is_empty());
    }

    #[test]
    fn test_group_sentences_respects_limit() {
        let text = "One two three. Four five six. Seven eight nine.";
        let grouped = group_sentences(text, 30);
        assert_eq!(
            grouped,
            vec!["One two three. Four five six.", "Seven eight nine."]
        );

        for paragraph in &grouped {
            assert_eq!(paragraph.trim(), paragraph);
            assert!(!paragraph.is_empty());
        }
    }

    #[test]
    fn test_group_sentences_long_sentence_has_no_empty_paragraph() {
        let long = "x".repeat(40);
        let grouped = group_sentences(&format!("{}. short.", long), 10);
        assert_eq!(grouped, vec![format!("{}.", long), "short.".to_string()]);
    }

    #[test]
    fn test_group_sentences_only_periods() {
        assert!(group_sentences("...", 500).is_empty());
    }

    #[tokio::test]
    async fn test_direct_split_makes_no_llm_call() {
        let llm = ScriptedCompletion::failing();
        let text = numbered_paragraphs(4);

        let paragraphs = segmenter().segment(&llm, &text).await.unwrap();

        assert_eq!(paragraphs, split_blank_lines(&text));
        assert_eq!(paragraphs.len(), 4);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_direct_split_keeps_fragments_verbatim() {
        let llm = ScriptedCompletion::failing();
        let text = "  indented first\n\nsecond  \n\nthird";

        let paragraphs = segmenter().segment(&llm, text).await.unwrap();
        assert_eq!(paragraphs, vec!["  indented first", "second  ", "third"]);
    }

    #[tokio::test]
    async fn test_direct_split_keeps_indentation_of_later_paragraphs() {
        let llm = ScriptedCompletion::failing();
        let text = "First para.\n\n    Indented second.\n \t\n\tTabbed third.";

        let paragraphs = segmenter().segment(&llm, text).await.unwrap();

        assert_eq!(
            paragraphs,
            vec!["First para.", "    Indented second.", "\tTabbed third."]
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_llm_call() {
        for max in [0, 1, 10] {
            let llm = ScriptedCompletion::failing();
            let paragraphs = segmenter()
                .segment_with_limit(&llm, "   \n\n ", max)
                .await
                .unwrap();
            assert!(paragraphs.is_empty());
            assert_eq!(llm.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_too_many_paragraphs_asks_llm_to_reorganize() {
        let llm = ScriptedCompletion::new(&["A\n\nB\n\nC\n\nD\n\nE\n\nF"]);
        let text = numbered_paragraphs(12);

        let paragraphs = segmenter()
            .segment_with_limit(&llm, &text, 5)
            .await
            .unwrap();

        assert_eq!(paragraphs, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(llm.calls(), 1);
        assert!(llm.prompts()[0].contains("into 5 meaningful"));
    }

    #[tokio::test]
    async fn test_too_many_paragraphs_with_empty_reply_keeps_direct_split() {
        let llm = ScriptedCompletion::new(&["  \n\n  "]);
        let text = numbered_paragraphs(12);

        let paragraphs = segmenter().segment(&llm, &text).await.unwrap();

        assert_eq!(paragraphs.len(), 10);
        assert!(paragraphs[0].starts_with("Paragraph number 1 "));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_too_few_paragraphs_asks_llm_to_split() {
        let llm = ScriptedCompletion::new(&["First part.\n\nSecond part.\n\nThird part."]);

        let paragraphs = segmenter()
            .segment(&llm, "One long block of text. With a few sentences.")
            .await
            .unwrap();

        assert_eq!(paragraphs, vec!["First part.", "Second part.", "Third part."]);
        assert_eq!(llm.calls(), 1);
        assert!(llm.prompts()[0].contains("5-10 meaningful"));
    }

    #[tokio::test]
    async fn test_too_few_paragraphs_falls_back_to_sentences() {
        let llm = ScriptedCompletion::new(&["\n\n"]);
        let segmenter = ParagraphSegmenter {
            max_paragraphs: 10,
            min_direct_paragraphs: 3,
            fallback_chars: 25,
        };

        let paragraphs = segmenter
            .segment(&llm, "Alpha beta gamma. Delta epsilon.\nZeta eta theta.")
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(
            paragraphs,
            vec!["Alpha beta gamma.", "Delta epsilon.", "Zeta eta theta."]
        );
        assert!(paragraphs.iter().all(|p| !p.trim().is_empty() && p.trim() == p));
    }

    #[tokio::test]
    async fn test_sentence_fallback_is_truncated() {
        let llm = ScriptedCompletion::new(&[""]);
        let segmenter = ParagraphSegmenter {
            max_paragraphs: 10,
            min_direct_paragraphs: 3,
            fallback_chars: 10,
        };
        let text = "One. Two. Three. Four.";
        assert_eq!(group_sentences(text, 10).len(), 3);

        let paragraphs = segmenter.segment_with_limit(&llm, text, 2).await.unwrap();

        assert_eq!(paragraphs, vec!["One. Two.", "Three."]);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_never_exceeds_max_paragraphs() {
        let reply = numbered_paragraphs(20);
        let llm = ScriptedCompletion::new(&[reply.as_str()]);

        let paragraphs = segmenter()
            .segment_with_limit(&llm, "short text", 4)
            .await
            .unwrap();
        assert_eq!(paragraphs.len(), 4);
    }

    #[tokio::test]
    async fn test_llm_failure_is_wrapped_once() {
        let llm = ScriptedCompletion::failing();

        let err = segmenter()
            .segment(&llm, "only one paragraph here")
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Paragraphs));
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_segment_is_deterministic() {
        let reply = "One.\n\nTwo.\n\nThree.";
        let llm = ScriptedCompletion::new(&[reply, reply]);
        let text = "A single paragraph without breaks.";

        let first = segmenter().segment(&llm, text).await.unwrap();
        let second = segmenter().segment(&llm, text).await.unwrap();
        assert_eq!(first, second);
    }
}
