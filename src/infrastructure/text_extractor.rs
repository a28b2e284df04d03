//! 文本提取器 - 基础设施层
//!
//! 持有外部资源（PDF 解析、tesseract 进程），只暴露"文档 → 文本"的能力

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ExtractionError};
use crate::models::{Document, MediaType};

/// 文本提取器
///
/// 职责：
/// - PDF 按页提取文本并拼接
/// - 图片调用 tesseract 做 OCR
/// - 不关心摘要、段落、题目
#[derive(Debug, Clone)]
pub struct TextExtractor {
    tesseract_path: String,
    ocr_language: String,
}

impl TextExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            tesseract_path: config.tesseract_path.clone(),
            ocr_language: config.ocr_language.clone(),
        }
    }

    /// 从文档中提取全部文本
    ///
    /// 文档在提取后即被丢弃，所以这里按值接收。
    pub async fn extract(&self, document: Document) -> AppResult<String> {
        info!(
            "📄 正在提取文本: {} ({}, {} 字节)",
            document.name,
            document.media_type,
            document.bytes.len()
        );

        let text = match document.media_type {
            MediaType::Pdf => extract_pdf(document.bytes).await?,
            MediaType::Image(_) => self.extract_image(&document.bytes).await?,
        };

        if text.trim().is_empty() {
            warn!("⚠️ 文档 {} 没有提取到任何文本", document.name);
        } else {
            info!("✓ 提取完成，共 {} 个字符", text.chars().count());
        }

        Ok(text)
    }

    /// 调用 tesseract 识别图片文字
    async fn extract_image(&self, bytes: &[u8]) -> AppResult<String> {
        debug!(
            "调用 OCR: {} (语言: {})",
            self.tesseract_path, self.ocr_language
        );

        let mut child = Command::new(&self.tesseract_path)
            .arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(&self.ocr_language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExtractionError::OcrUnavailable {
                program: self.tesseract_path.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(bytes)
                .await
                .map_err(|e| ExtractionError::OcrFailed {
                    message: format!("写入图片数据失败: {}", e),
                })?;
            // stdin 在这里关闭，tesseract 才会开始识别
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractionError::OcrFailed {
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::OcrFailed {
                message: format!("{} ({})", stderr.trim(), output.status),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// 按页提取 PDF 文本，每页后追加一个空行
///
/// 解析是 CPU 密集的同步操作，放到阻塞线程池里执行。
async fn extract_pdf(bytes: Vec<u8>) -> AppResult<String> {
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
    })
    .await
    .map_err(AppError::pdf_parse_failed)?
    .map_err(|e| ExtractionError::PdfParseFailed {
        source: e.to_string().into(),
    })?;

    debug!("PDF 共 {} 页", pages.len());

    Ok(join_pages(&pages))
}

fn join_pages(pages: &[String]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push_str("\n\n");
    }
    text
}
