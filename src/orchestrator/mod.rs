//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把用户动作分发到流程层，并持有会话状态，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `study_session` - 学习会话
//! - 持有 `SessionState`、`TextExtractor` 和 `StudyFlow`
//! - 处理上传、清空、切换标签、翻段、显示答案、出题、导出等动作
//! - 把错误转换成一条给用户看的提示
//!
//! ### `view` - 渲染快照
//! - 每个动作返回一个 `SessionView`，界面层只负责显示
//!
//! ## 层次关系
//!
//! ```text
//! cli (读取命令，打印 SessionView)
//!     ↓
//! study_session (处理一个动作)
//!     ↓
//! workflow::StudyFlow (一份文档：摘要 → 切段 → 出题)
//!     ↓
//! services (能力层：llm / summary / paragraph / question)
//!     ↓
//! infrastructure (基础设施：TextExtractor)
//! ```

pub mod study_session;
pub mod view;

pub use study_session::{user_message, StudySession};
pub use view::{PracticeView, SessionView, ViewBody};
