use std::path::Path;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 段落与题目 ---
    /// 每个文档最多保留的段落数
    pub max_paragraphs: usize,
    /// 直接按空行切分时至少需要的段落数
    pub min_direct_paragraphs: usize,
    /// 按句子兜底分组时每段的字符上限
    pub fallback_paragraph_chars: usize,
    /// 每个段落生成的题目数量
    pub questions_per_paragraph: usize,
    /// 同一道题出现多个答案行时是否报错
    pub strict_answer_parsing: bool,
    // --- OCR 配置 ---
    pub ocr_language: String,
    pub tesseract_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai/".to_string(),
            llm_model_name: "gemini-1.5-flash".to_string(),
            llm_temperature: 0.3,
            llm_max_tokens: 2048,
            max_paragraphs: 10,
            min_direct_paragraphs: 3,
            fallback_paragraph_chars: 500,
            questions_per_paragraph: 3,
            strict_answer_parsing: false,
            ocr_language: "eng".to_string(),
            tesseract_path: "tesseract".to_string(),
            verbose_logging: false,
        }
    }
}

/// 配置文件（TOML），所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_key: Option<String>,
    api_base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_paragraphs: Option<usize>,
    min_direct_paragraphs: Option<usize>,
    fallback_paragraph_chars: Option<usize>,
    questions_per_paragraph: Option<usize>,
    strict_answer_parsing: Option<bool>,
    ocr_language: Option<String>,
    tesseract_path: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 按 默认值 → 配置文件 → 环境变量 的顺序加载配置
    ///
    /// 未显式指定配置文件时读取 `DOC_SUM_CONFIG`。
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let env_path = std::env::var("DOC_SUM_CONFIG").ok();
        let path = config_file.or(env_path.as_deref().map(Path::new));

        let base = match path {
            Some(path) => Self::default().merge_file(path)?,
            None => Self::default(),
        };

        Ok(base.merge_env())
    }

    /// 只读取环境变量
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// 是否配置了 API 密钥
    pub fn has_api_key(&self) -> bool {
        !self.llm_api_key.trim().is_empty()
    }

    fn merge_file(self, path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::FileNotFound { path: display }.into());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: display.clone(),
            source,
        })?;

        let file: FileConfig = toml::from_str(&content)
            .map_err(|source| ConfigError::TomlParseFailed { path: display, source })?;

        Ok(self.merge_file_config(file))
    }

    fn merge_file_config(self, file: FileConfig) -> Self {
        Self {
            llm_api_key: file.api_key.unwrap_or(self.llm_api_key),
            llm_api_base_url: file.api_base_url.unwrap_or(self.llm_api_base_url),
            llm_model_name: file.model.unwrap_or(self.llm_model_name),
            llm_temperature: file.temperature.unwrap_or(self.llm_temperature),
            llm_max_tokens: file.max_tokens.unwrap_or(self.llm_max_tokens),
            max_paragraphs: file.max_paragraphs.unwrap_or(self.max_paragraphs),
            min_direct_paragraphs: file.min_direct_paragraphs.unwrap_or(self.min_direct_paragraphs),
            fallback_paragraph_chars: file
                .fallback_paragraph_chars
                .unwrap_or(self.fallback_paragraph_chars),
            questions_per_paragraph: file
                .questions_per_paragraph
                .unwrap_or(self.questions_per_paragraph),
            strict_answer_parsing: file.strict_answer_parsing.unwrap_or(self.strict_answer_parsing),
            ocr_language: file.ocr_language.unwrap_or(self.ocr_language),
            tesseract_path: file.tesseract_path.unwrap_or(self.tesseract_path),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
        }
    }

    fn merge_env(self) -> Self {
        Self {
            llm_api_key: std::env::var("GEMINI_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("MODEL").unwrap_or(self.llm_model_name),
            llm_temperature: parse_env("LLM_TEMPERATURE").unwrap_or(self.llm_temperature),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS").unwrap_or(self.llm_max_tokens),
            max_paragraphs: parse_env("MAX_PARAGRAPHS").unwrap_or(self.max_paragraphs),
            min_direct_paragraphs: self.min_direct_paragraphs,
            fallback_paragraph_chars: parse_env("FALLBACK_PARAGRAPH_CHARS")
                .unwrap_or(self.fallback_paragraph_chars),
            questions_per_paragraph: parse_env("QUESTIONS_PER_PARAGRAPH")
                .unwrap_or(self.questions_per_paragraph),
            strict_answer_parsing: parse_env("STRICT_ANSWER_PARSING")
                .unwrap_or(self.strict_answer_parsing),
            ocr_language: std::env::var("OCR_LANGUAGE").unwrap_or(self.ocr_language),
            tesseract_path: std::env::var("TESSERACT_PATH").unwrap_or(self.tesseract_path),
            verbose_logging: parse_env("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
