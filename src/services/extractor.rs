//! 文档提取服务 - 业务能力层
//!
//! 只负责"把一个上传文件变成文本"的能力，不关心流程
//!
//! ## 支持的格式
//! - `application/pdf`：逐页提取，每页文本后追加换行；无文本的页贡献空串
//! - `text/plain`：按 UTF-8 解码
//! - Word (docx)：逐段提取，段落之间以换行连接
//!
//! 其他类型返回 `UnsupportedFormat`。任何解析失败（包括解析库内部 panic）
//! 都转换为 `ExtractionError`，不会向调用方抛出。

use std::panic::{catch_unwind, UnwindSafe};

use phf::phf_map;
use tracing::{debug, warn};

use crate::models::{ExtractedDocument, UploadedFile};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    PlainText,
    Docx,
}

static DOCUMENT_KINDS: phf::Map<&'static str, DocumentKind> = phf_map! {
    "application/pdf" => DocumentKind::Pdf,
    "text/plain" => DocumentKind::PlainText,
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => DocumentKind::Docx,
};

/// 文档提取服务
///
/// 职责：
/// - 按声明的 MIME 类型提取文本
/// - 每个输入文件都产出一个完整的 `ExtractedDocument`
/// - 不做合并、不调用模型
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 是否支持该 MIME 类型
    pub fn supports(mime_type: &str) -> bool {
        let essence = UploadedFile::new("", mime_type, Vec::new()).essence();
        DOCUMENT_KINDS.contains_key(essence.as_str())
    }

    /// 提取单个文件
    pub fn extract(&self, file: &UploadedFile) -> ExtractedDocument {
        let essence = file.essence();
        debug!(
            "提取文档: {} (类型: {}, {} 字节)",
            file.name,
            essence,
            file.bytes.len()
        );

        let Some(kind) = DOCUMENT_KINDS.get(essence.as_str()).copied() else {
            warn!("不支持的文件格式: {} ({})", file.name, file.mime_type);
            return ExtractedDocument::unsupported(&file.name);
        };

        let bytes = file.bytes.as_slice();
        let result = match kind {
            DocumentKind::Pdf => guarded(|| extract_pdf(bytes)),
            DocumentKind::PlainText => extract_plain_text(bytes),
            DocumentKind::Docx => guarded(|| extract_docx(bytes)),
        };

        match result {
            Ok(text) => {
                debug!("✓ {} 提取完成 ({} 字符)", file.name, text.chars().count());
                ExtractedDocument::ok(&file.name, text)
            }
            Err(message) => {
                warn!("读取文件失败 {}: {}", file.name, message);
                ExtractedDocument::failed(&file.name, message)
            }
        }
    }
}

/// 将解析库内部的 panic 转成普通错误
fn guarded<F>(f: F) -> Result<String, String>
where
    F: FnOnce() -> Result<String, String> + UnwindSafe,
{
    catch_unwind(f).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(format!("parser aborted: {}", detail))
    })
}

fn extract_pdf(bytes: &[u8]) -> Result<String, String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| e.to_string())?;

    let mut text = String::new();
    for page in pages {
        text.push_str(&page);
        text.push('\n');
    }
    Ok(text)
}

fn extract_plain_text(bytes: &[u8]) -> Result<String, String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())
}

fn extract_docx(bytes: &[u8]) -> Result<String, String> {
    use docx_rs::DocumentChild;

    let docx = docx_rs::read_docx(bytes).map_err(|e| format!("{:?}", e))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// Paragraph → Run → Text
fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    use docx_rs::{ParagraphChild, RunChild};

    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                if let RunChild::Text(t) = rc {
                    text.push_str(&t.text);
                }
            }
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionStatus;

    /// 用 lopdf 生成一个带文本层的单页 PDF
    fn make_test_pdf(text: &str) -> Vec<u8> {
        use lopdf::dictionary;
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn make_test_docx(paragraphs: &[&str]) -> Vec<u8> {
        use docx_rs::{Docx, Paragraph, Run};

        let mut docx = Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
        }

        let mut cursor = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_plain_text_utf8() {
        let file = UploadedFile::new("req.txt", "text/plain", "登录需要支持 OAuth".as_bytes().to_vec());
        let doc = DocumentExtractor::new().extract(&file);
        assert_eq!(doc.status, ExtractionStatus::Ok);
        assert_eq!(doc.text, "登录需要支持 OAuth");
        assert_eq!(doc.source_name, "req.txt");
    }

    #[test]
    fn test_plain_text_with_charset_parameter() {
        let file = UploadedFile::new("req.txt", "text/plain; charset=utf-8", b"hello".to_vec());
        assert!(DocumentExtractor::new().extract(&file).is_ok());
    }

    #[test]
    fn test_invalid_utf8_is_extraction_error() {
        let file = UploadedFile::new("bad.txt", "text/plain", vec![0xff, 0xfe, 0x00, 0xc3]);
        let doc = DocumentExtractor::new().extract(&file);
        assert!(matches!(doc.status, ExtractionStatus::ExtractionError(_)));
        assert!(doc.text.is_empty());
    }

    #[test]
    fn test_unsupported_type() {
        let file = UploadedFile::new("pic.png", "image/png", vec![0x89, 0x50, 0x4e, 0x47]);
        let doc = DocumentExtractor::new().extract(&file);
        assert_eq!(doc.status, ExtractionStatus::UnsupportedFormat);
    }

    #[test]
    fn test_garbage_pdf_never_raises() {
        let inputs: Vec<Vec<u8>> = vec![
            b"not a pdf".to_vec(),
            Vec::new(),
            b"%PDF-1.4\n%%EOF".to_vec(),
            (0u8..=255).collect(),
        ];
        for bytes in inputs {
            let file = UploadedFile::new("x.pdf", MIME_PDF, bytes);
            let doc = DocumentExtractor::new().extract(&file);
            assert!(
                matches!(doc.status, ExtractionStatus::ExtractionError(_) | ExtractionStatus::Ok),
                "unexpected status {:?}",
                doc.status
            );
        }
    }

    #[test]
    fn test_garbage_docx_never_raises() {
        let file = UploadedFile::new("x.docx", MIME_DOCX, b"PK\x03\x04garbage".to_vec());
        let doc = DocumentExtractor::new().extract(&file);
        assert!(matches!(doc.status, ExtractionStatus::ExtractionError(_)));
    }

    #[test]
    fn test_pdf_text_layer() {
        let file = UploadedFile::new("requirements.pdf", MIME_PDF, make_test_pdf("Hello World from TestBuddy"));
        let doc = DocumentExtractor::new().extract(&file);
        assert!(doc.is_ok(), "status: {:?}", doc.status);
        assert!(
            doc.text.contains("Hello") || doc.text.contains("World"),
            "got: {}",
            doc.text
        );
        assert!(doc.text.ends_with('\n'));
    }

    #[test]
    fn test_docx_paragraphs_joined_by_newline() {
        let file = UploadedFile::new(
            "requirements.docx",
            MIME_DOCX,
            make_test_docx(&["Users can log in", "Passwords expire after 90 days"]),
        );
        let doc = DocumentExtractor::new().extract(&file);
        assert!(doc.is_ok(), "status: {:?}", doc.status);
        assert_eq!(doc.text, "Users can log in\nPasswords expire after 90 days");
    }

    #[test]
    fn test_supports() {
        assert!(DocumentExtractor::supports("application/pdf"));
        assert!(DocumentExtractor::supports("TEXT/PLAIN; charset=utf-8"));
        assert!(DocumentExtractor::supports(MIME_DOCX));
        assert!(!DocumentExtractor::supports("application/msword"));
    }
}
