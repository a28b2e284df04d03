//! 渲染快照
//!
//! 每个动作处理完都返回一个 [`SessionView`]，界面层只负责把它显示出来

use std::fmt;

use crate::models::QaPair;
use crate::workflow::{SessionState, Tab};

/// 练习页内容
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeView {
    /// 从 1 开始
    pub position: usize,
    pub total: usize,
    pub paragraph: String,
    pub questions: Vec<QaPair>,
    pub show_answers: bool,
    pub has_previous: bool,
    pub has_next: bool,
}

/// 当前标签页的内容
#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Upload { text_chars: usize },
    Summary { summary: Option<String> },
    Practice(Option<PracticeView>),
}

/// 会话渲染快照
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub tab: Tab,
    pub body: ViewBody,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl SessionView {
    pub fn from_state(state: &SessionState) -> Self {
        let body = match state.active_tab {
            Tab::Upload => ViewBody::Upload {
                text_chars: state.extracted_text.chars().count(),
            },
            Tab::Summary => ViewBody::Summary {
                summary: (!state.summary.is_empty()).then(|| state.summary.clone()),
            },
            Tab::Practice => ViewBody::Practice(state.current_paragraph().map(|paragraph| {
                PracticeView {
                    position: state.paragraph_index + 1,
                    total: state.paragraphs.len(),
                    paragraph: paragraph.to_string(),
                    questions: state.generated_questions.clone(),
                    show_answers: state.show_answers,
                    has_previous: state.has_previous(),
                    has_next: state.has_next(),
                }
            })),
        };

        Self {
            tab: state.active_tab,
            body,
            error: state.last_error.clone(),
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "DOC-SUM | 📄 上传  📝 摘要  ❓ 练习 | 当前: {}", self.tab)?;
        writeln!(f, "{}", "=".repeat(60))?;

        if let Some(error) = &self.error {
            writeln!(f, "❌ {}", error)?;
        }
        if let Some(notice) = &self.notice {
            writeln!(f, "💡 {}", notice)?;
        }

        match &self.body {
            ViewBody::Upload { text_chars } => {
                writeln!(f, "📄 上传学习资料")?;
                if *text_chars > 0 {
                    writeln!(f, "已载入文本: {} 个字符", text_chars)?;
                }
                writeln!(f, "输入 `upload <路径>` 处理 PDF 或图片 (pdf/png/jpg/jpeg)")?;
            }
            ViewBody::Summary { summary } => {
                writeln!(f, "📝 文档摘要\n")?;
                match summary {
                    Some(summary) => {
                        writeln!(f, "{}", summary)?;
                        writeln!(f, "\n输入 `practice` 进入练习")?;
                    }
                    None => writeln!(f, "暂无摘要，请先上传并处理文件。")?,
                }
            }
            ViewBody::Practice(None) => {
                writeln!(f, "❓ 练习题\n")?;
                writeln!(f, "没有可出题的内容，请先上传并处理文件。")?;
            }
            ViewBody::Practice(Some(practice)) => write_practice(f, practice)?,
        }

        Ok(())
    }
}

fn write_practice(f: &mut fmt::Formatter<'_>, practice: &PracticeView) -> fmt::Result {
    writeln!(f, "❓ 练习题")?;
    writeln!(f, "段落 {} / {}\n", practice.position, practice.total)?;
    writeln!(f, "### 内容")?;
    writeln!(f, "{}\n", practice.paragraph.trim())?;

    if practice.questions.is_empty() {
        writeln!(f, "输入 `gen` 为本段生成题目")?;
    } else {
        writeln!(f, "### 题目")?;
        for (i, pair) in practice.questions.iter().enumerate() {
            writeln!(f, "Q{}: {}", i + 1, pair.question)?;
            if practice.show_answers {
                writeln!(f, "A{}: {}", i + 1, pair.answer)?;
            }
        }
        writeln!(f, "\n输入 `answers` 显示/隐藏答案")?;
    }

    let mut nav = Vec::new();
    if practice.has_previous {
        nav.push("`prev` 上一段");
    }
    if practice.has_next {
        nav.push("`next` 下一段");
    }
    if !nav.is_empty() {
        writeln!(f, "{}", nav.join("  "))?;
    }

    Ok(())
}
