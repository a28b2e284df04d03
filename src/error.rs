use std::fmt;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文本提取错误
    #[error("文本提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 某个处理阶段失败（包装底层原因）
    #[error("{stage}失败: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<AppError>,
    },
}

/// 处理阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 生成摘要
    Summary,
    /// 段落切分
    Paragraphs,
    /// 题目生成
    Questions,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Summary => write!(f, "摘要生成"),
            Stage::Paragraphs => write!(f, "段落切分"),
            Stage::Questions => write!(f, "题目生成"),
        }
    }
}

/// 错误大类，编排层据此决定展示给用户的信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Extraction,
    Service,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 未设置 API 密钥
    #[error("未设置 API 密钥 (GEMINI_API_KEY)")]
    MissingApiKey,
    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 不支持的文件类型
    #[error("不支持的文件类型: {media_type}，请上传 PDF 或图片")]
    UnsupportedType { media_type: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// PDF 解析失败
    #[error("PDF解析失败: {source}")]
    PdfParseFailed {
        #[source]
        source: BoxError,
    },
    /// OCR 程序无法启动
    #[error("无法启动 OCR 程序 {program}: {source}")]
    OcrUnavailable {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// OCR 识别失败
    #[error("OCR识别失败: {message}")]
    OcrFailed { message: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: BoxError,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 返回内容只有空白
    #[error("LLM返回了空白内容")]
    BlankResponse,
    /// 同一道题出现了多个答案行（严格模式）
    #[error("题目 \"{question}\" 出现了多个答案行")]
    DuplicateAnswer { question: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建LLM API调用错误
    pub fn llm_api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        })
    }

    /// 创建PDF解析错误
    pub fn pdf_parse_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Extraction(ExtractionError::PdfParseFailed {
            source: Box::new(source),
        })
    }

    /// 用处理阶段包装错误
    pub fn in_stage(self, stage: Stage) -> Self {
        AppError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// 错误大类（穿透阶段包装）
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) => ErrorKind::Configuration,
            AppError::Extraction(_) => ErrorKind::Extraction,
            AppError::Llm(_) => ErrorKind::Service,
            AppError::Stage { source, .. } => source.kind(),
        }
    }

    /// 失败的处理阶段（如果有）
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AppError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
