//! 题目生成服务 - 业务能力层
//!
//! 针对单个段落请求若干问答对，并把 LLM 的纯文本回复解析成 [`QaPair`]

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, LlmError, Stage};
use crate::models::QaPair;
use crate::services::CompletionService;

/// 题目生成服务
///
/// 职责：
/// - 只处理单个段落
/// - 拼接出题提示词
/// - 解析 `Q1: ... / A1: ...` 格式的回复
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    questions_per_paragraph: usize,
    strict: bool,
}

impl QuestionGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            questions_per_paragraph: config.questions_per_paragraph,
            strict: config.strict_answer_parsing,
        }
    }

    /// 严格模式：同一道题出现两行答案时报错，而不是保留后一行
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// 按配置的数量生成题目
    pub async fn generate<C: CompletionService>(
        &self,
        llm: &C,
        paragraph: &str,
    ) -> AppResult<Vec<QaPair>> {
        self.generate_n(llm, paragraph, self.questions_per_paragraph)
            .await
    }

    /// 为段落生成 `count` 道题
    ///
    /// 段落为空时直接返回空列表，不调用 LLM；失败时返回 [`Stage::Questions`] 错误，不重试。
    pub async fn generate_n<C: CompletionService>(
        &self,
        llm: &C,
        paragraph: &str,
        count: usize,
    ) -> AppResult<Vec<QaPair>> {
        if paragraph.trim().is_empty() {
            warn!("出题段落为空，跳过");
            return Ok(Vec::new());
        }
        if count == 0 {
            warn!("请求的题目数量为 0，跳过");
            return Ok(Vec::new());
        }

        self.request_questions(llm, paragraph, count)
            .await
            .map_err(|e| {
                error!("生成题目失败: {}", e);
                e.in_stage(Stage::Questions)
            })
    }

    async fn request_questions<C: CompletionService>(
        &self,
        llm: &C,
        paragraph: &str,
        count: usize,
    ) -> AppResult<Vec<QaPair>> {
        let prompt = build_question_prompt(paragraph, count);
        debug!("出题提示词长度: {} 字符", prompt.len());

        let response = llm.complete(&prompt).await?;
        let pairs = parse_qa_response(&response, self.strict)?;

        info!("✓ 解析出 {} 道题 (请求 {} 道)", pairs.len(), count);
        Ok(pairs)
    }
}

/// 解析 LLM 回复中的问答对
///
/// - 以 `Q` 开头且含冒号的行是题目，以 `A` 开头且含冒号的行是答案，取第一个冒号后的内容
/// - 新题目出现时，上一道题只有在题目和答案都非空时才会输出
/// - 同一道题的第二行答案会覆盖第一行；`strict` 为真时改为返回
///   [`LlmError::DuplicateAnswer`]
/// - 结尾没有答案的题目被丢弃
pub fn parse_qa_response(response: &str, strict: bool) -> AppResult<Vec<QaPair>> {
    let mut pairs = Vec::new();
    let mut question = String::new();
    let mut answer = String::new();

    for line in response.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((_, rest)) = line.split_once(':') else {
            continue;
        };
        let rest = rest.trim();

        if line.starts_with('Q') {
            if !question.is_empty() && !answer.is_empty() {
                pairs.push(QaPair::new(
                    std::mem::take(&mut question),
                    std::mem::take(&mut answer),
                ));
            }
            question = rest.to_string();
            answer.clear();
        } else if line.starts_with('A') {
            if !answer.is_empty() {
                if strict {
                    return Err(LlmError::DuplicateAnswer { question }.into());
                }
                debug!("题目 \"{}\" 有多行答案，保留最后一行", question);
            }
            answer = rest.to_string();
        }
    }

    if !question.is_empty() && !answer.is_empty() {
        pairs.push(QaPair::new(question, answer));
    }

    Ok(pairs)
}

fn build_question_prompt(paragraph: &str, count: usize) -> String {
    let format_example = (1..=count)
        .map(|i| format!("Q{i}: [Question {i}]\nA{i}: [Answer {i}]"))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Based on the following paragraph, generate {} quiz questions that would test understanding of the key concepts. For each question, provide a detailed answer.

Paragraph:
{}

Format your response as follows:
{}

Make sure the questions:
1. Test different aspects of the content
2. Vary in difficulty
3. Include some that require critical thinking
4. Are clear and unambiguous
"#,
        count, paragraph, format_example
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorKind};
    use crate::services::test_support::ScriptedCompletion;

    fn generator() -> QuestionGenerator {
        QuestionGenerator::new(&Config::default())
    }

    #[test]
    fn test_parse_two_pairs() {
        let response = "Q1: What is X?\nA1: X is Y.\n\nQ2: Why?\nA2: Because Z.";
        let pairs = parse_qa_response(response, false).unwrap();
        assert_eq!(
            pairs,
            vec![
                QaPair::new("What is X?", "X is Y."),
                QaPair::new("Why?", "Because Z."),
            ]
        );
    }

    #[test]
    fn test_parse_drops_dangling_question() {
        let response = "Q1: What is X?\nA1: X is Y.\nQ2: Unanswered?";
        let pairs = parse_qa_response(response, false).unwrap();
        assert_eq!(pairs, vec![QaPair::new("What is X?", "X is Y.")]);
    }

    #[test]
    fn test_parse_drops_question_without_answer_in_middle() {
        let response = "Q1: First?\nQ2: Second?\nA2: Two.";
        let pairs = parse_qa_response(response, false).unwrap();
        assert_eq!(pairs, vec![QaPair::new("Second?", "Two.")]);
    }

    #[test]
    fn test_parse_second_answer_overwrites_first() {
        let response = "Q1: What?\nA1: first answer\nA1: second answer";
        let pairs = parse_qa_response(response, false).unwrap();
        assert_eq!(pairs, vec![QaPair::new("What?", "second answer")]);
    }

    #[test]
    fn test_parse_strict_rejects_second_answer() {
        let response = "Q1: What?\nA1: first answer\nA1: second answer";
        let err = parse_qa_response(response, true).unwrap_err();
        assert!(matches!(
            err,
            AppError::Llm(LlmError::DuplicateAnswer { ref question }) if question == "What?"
        ));
    }

    #[test]
    fn test_parse_keeps_text_after_first_colon() {
        let response = "Question 1: Ratio of a:b?\nAnswer: It is 2:1.";
        let pairs = parse_qa_response(response, false).unwrap();
        assert_eq!(pairs, vec![QaPair::new("Ratio of a:b?", "It is 2:1.")]);
    }

    #[test]
    fn test_parse_ignores_unrelated_lines() {
        let response = "Here are your questions:\n\nQ1: One?\nNote: careful\nA1: Yes.\nQ2 without colon\n";
        let pairs = parse_qa_response(response, false).unwrap();
        assert_eq!(pairs, vec![QaPair::new("One?", "Yes.")]);
    }

    #[test]
    fn test_parse_empty_answer_is_not_emitted() {
        let response = "Q1: Empty answer?\nA1:   ";
        assert!(parse_qa_response(response, false).unwrap().is_empty());
    }

    #[test]
    fn test_prompt_numbers_questions() {
        let prompt = build_question_prompt("Cells divide.", 4);
        assert!(prompt.contains("generate 4 quiz questions"));
        assert!(prompt.contains("Q4: [Question 4]\nA4: [Answer 4]"));
        assert!(!prompt.contains("Q5:"));
        assert!(prompt.contains("Cells divide."));
    }

    #[tokio::test]
    async fn test_generate_empty_paragraph_makes_no_call() {
        let llm = ScriptedCompletion::failing();
        let pairs = generator().generate(&llm, "   ").await.unwrap();
        assert!(pairs.is_empty());
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_generate_parses_reply() {
        let llm = ScriptedCompletion::new(&["Q1: What is X?\nA1: X is Y.\n\nQ2: Why?\nA2: Because Z."]);

        let pairs = generator()
            .generate(&llm, "X is Y because Z.")
            .await
            .unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], QaPair::new("Why?", "Because Z."));
        assert!(llm.prompts()[0].contains("generate 3 quiz questions"));
    }

    #[tokio::test]
    async fn test_generate_failure_is_wrapped() {
        let llm = ScriptedCompletion::failing();
        let err = generator().generate(&llm, "Some paragraph.").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Questions));
        assert_eq!(err.kind(), ErrorKind::Service);
    }

    #[test]
    fn test_generate_strict_duplicate_is_wrapped() {
        let llm = ScriptedCompletion::new(&["Q1: What?\nA1: one\nA1: two"]);
        let result = tokio_test::block_on(
            generator().strict(true).generate(&llm, "Some paragraph."),
        );
        let err = tokio_test::assert_err!(result);
        assert_eq!(err.stage(), Some(Stage::Questions));
    }
}
