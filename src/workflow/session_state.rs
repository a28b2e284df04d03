//! 会话状态
//!
//! 显式保存界面状态，由编排层持有并逐个动作修改

use std::fmt::Display;

use crate::models::QaPair;

/// 当前标签页
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Summary,
    Practice,
}

impl Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tab::Upload => write!(f, "上传"),
            Tab::Summary => write!(f, "摘要"),
            Tab::Practice => write!(f, "练习"),
        }
    }
}

/// 会话状态
///
/// 不变式：有段落时 `paragraph_index < paragraphs.len()`，没有段落时为 0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub active_tab: Tab,
    /// 提取出的全文
    pub extracted_text: String,
    pub summary: String,
    pub paragraphs: Vec<String>,
    pub paragraph_index: usize,
    /// 当前段落的题目，换段或重新生成时整体替换
    pub generated_questions: Vec<QaPair>,
    pub show_answers: bool,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清空所有与文档相关的状态，保留当前标签页
    pub fn clear(&mut self) {
        *self = Self {
            active_tab: self.active_tab,
            ..Self::default()
        };
    }

    /// 新文档开始处理前调用：换掉旧文本，丢弃旧摘要、段落和题目
    pub fn start_document(&mut self, text: String) {
        self.clear();
        self.extracted_text = text;
    }

    pub fn current_paragraph(&self) -> Option<&str> {
        self.paragraphs
            .get(self.paragraph_index)
            .map(String::as_str)
    }

    pub fn has_next(&self) -> bool {
        self.paragraph_index + 1 < self.paragraphs.len()
    }

    pub fn has_previous(&self) -> bool {
        self.paragraph_index > 0
    }

    /// 移到另一个段落，并丢弃上一段的题目
    pub(crate) fn move_to(&mut self, index: usize) {
        self.paragraph_index = index;
        self.show_answers = false;
        self.generated_questions.clear();
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.paragraphs.is_empty() {
            write!(f, "[{} 无段落]", self.active_tab)
        } else {
            write!(
                f,
                "[{} 段落 {}/{}]",
                self.active_tab,
                self.paragraph_index + 1,
                self.paragraphs.len()
            )
        }
    }
}
