use std::fmt;
use std::path::Path;

use crate::error::{AppResult, ExtractionError};

/// 图片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// 文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Image(ImageFormat),
}

impl MediaType {
    /// 根据文件扩展名识别类型（不区分大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(MediaType::Pdf),
            "png" => Some(MediaType::Image(ImageFormat::Png)),
            "jpg" | "jpeg" => Some(MediaType::Image(ImageFormat::Jpeg)),
            _ => None,
        }
    }

    /// 根据 MIME 类型识别
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.contains("pdf") {
            return Some(MediaType::Pdf);
        }
        match mime.as_str() {
            "image/png" => Some(MediaType::Image(ImageFormat::Png)),
            "image/jpeg" | "image/jpg" => Some(MediaType::Image(ImageFormat::Jpeg)),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            MediaType::Pdf => "application/pdf",
            MediaType::Image(ImageFormat::Png) => "image/png",
            MediaType::Image(ImageFormat::Jpeg) => "image/jpeg",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime())
    }
}

/// 上传的文档
///
/// 只在提取文本前存在，提取完成后即被丢弃
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes,
        }
    }

    /// 从文件加载文档，按扩展名识别类型
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        let media_type =
            MediaType::from_extension(ext).ok_or_else(|| ExtractionError::UnsupportedType {
                media_type: if ext.is_empty() {
                    "(无扩展名)".to_string()
                } else {
                    ext.to_string()
                },
            })?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ExtractionError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;

        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Self::new(name, media_type, bytes))
    }
}
