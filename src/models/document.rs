//! 文档相关数据结构
//!
//! `ExtractedDocument` 每个上传文件生成一个，创建后不再修改；
//! `CombinedDocument` 是最终发送给模型的合并文本。

use serde::Serialize;

use crate::utils::logging::truncate_text;

/// 提取状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Ok,
    UnsupportedFormat,
    ExtractionError(String),
}

/// 单个文件的提取结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub source_name: String,
    pub text: String,
    pub status: ExtractionStatus,
}

impl ExtractedDocument {
    pub fn ok(source_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            text: text.into(),
            status: ExtractionStatus::Ok,
        }
    }

    pub fn unsupported(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            text: String::new(),
            status: ExtractionStatus::UnsupportedFormat,
        }
    }

    pub fn failed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            text: String::new(),
            status: ExtractionStatus::ExtractionError(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ExtractionStatus::Ok
    }

    /// 面向用户的警告信息（提取成功时为 None）
    pub fn warning(&self) -> Option<String> {
        match &self.status {
            ExtractionStatus::Ok => None,
            ExtractionStatus::UnsupportedFormat => {
                Some(format!("{}: Unsupported file format", self.source_name))
            }
            ExtractionStatus::ExtractionError(message) => {
                Some(format!("{}: Error reading file: {}", self.source_name, message))
            }
        }
    }

    /// 提取文本的字符数
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// 预览文本（超出部分以 `...` 结尾）
    pub fn preview(&self, max_chars: usize) -> String {
        truncate_text(&self.text, max_chars)
    }
}

/// 合并后的输入文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedDocument {
    text: String,
    item_count: usize,
}

impl CombinedDocument {
    pub(crate) fn new(text: String, item_count: usize) -> Self {
        Self { text, item_count }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 参与合并的输入条数
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
