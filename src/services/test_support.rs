//! 测试用的补全服务桩

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{AppResult, LlmError};
use crate::services::CompletionService;

/// 按顺序返回预先写好的响应，并记录收到的提示词
pub(crate) struct ScriptedCompletion {
    responses: Mutex<VecDeque<AppResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub(crate) fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 每次调用都失败
    pub(crate) fn failing() -> Self {
        Self::new(&[])
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Err(LlmError::ApiCallFailed {
                model: "stub".to_string(),
                source: "no scripted response left".into(),
            }
            .into())
        })
    }
}
