//! 原始输入
//!
//! 请求一旦捕获即不可变

/// 上传的文件：声明的 MIME 类型 + 完整字节内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// 文件名（仅用于展示和日志）
    pub name: String,
    /// 声明的 MIME 类型，可能带参数（如 `text/plain; charset=utf-8`）
    pub mime_type: String,
    /// 文件内容
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// 去掉参数并转为小写后的 MIME 类型
    pub fn essence(&self) -> String {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

/// 一条原始输入：自由文本或上传文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Text(String),
    File(UploadedFile),
}
