//! LLM 服务 - 业务能力层
//!
//! 只负责"给一段提示词，拿回一段文本"的能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, LlmError};

/// 文本补全服务
///
/// 摘要、段落切分、题目生成都只依赖这个接口，测试时可以换成桩实现。
pub trait CompletionService {
    /// 发送提示词，返回模型生成的文本
    fn complete(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API
/// - 不拼接业务提示词
/// - 不解析业务结果
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    has_api_key: bool,
    temperature: f32,
    max_tokens: u32,
    system_message: Option<String>,
}

impl LlmService {
    /// 创建新的 LLM 服务
    ///
    /// 没有 API 密钥时也能创建成功，真正调用时才会报错。
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            has_api_key: config.has_api_key(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
            system_message: None,
        }
    }

    /// 设置系统消息
    pub fn with_system_message(mut self, system_message: impl Into<String>) -> Self {
        self.system_message = Some(system_message.into());
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
    ) -> AppResult<String> {
        if !self.has_api_key {
            warn!("未配置 API 密钥，拒绝调用 LLM");
            return Err(ConfigError::MissingApiKey.into());
        }

        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(|e| self.api_failed(e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(|e| self.api_failed(e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| self.api_failed(e))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            self.api_failed(e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    fn api_failed(&self, source: impl std::error::Error + Send + Sync + 'static) -> AppError {
        AppError::llm_api_failed(&self.model_name, source)
    }
}

impl CompletionService for LlmService {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.send_to_llm(prompt, self.system_message.as_deref()).await
    }
}
