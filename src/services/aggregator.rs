//! 输入合并服务 - 业务能力层
//!
//! 合并顺序固定：feature document → 自由文本（提交顺序）→ 文档文本（上传顺序），
//! 各项之间用空行分隔。只有空串不参与合并，只含空白的项原样保留。

use tracing::debug;

use crate::error::ValidationError;
use crate::models::{CombinedDocument, ExtractedDocument};

/// 各项之间的分隔符
pub const SEPARATOR: &str = "\n\n";

/// 合并所有输入
///
/// 提取失败的文档会被过滤掉；全部输入为空时返回 `ValidationError::NoInput`，
/// 调用方必须在调用模型之前检查。
pub fn aggregate(
    feature_document: Option<&str>,
    free_texts: &[String],
    documents: &[ExtractedDocument],
) -> Result<CombinedDocument, ValidationError> {
    let mut items: Vec<&str> = Vec::new();

    if let Some(feature) = feature_document.filter(|s| has_content(s)) {
        debug!("🔍 添加 feature document ({} 字符)", feature.chars().count());
        items.push(feature);
    }

    for text in free_texts.iter().filter(|s| has_content(s)) {
        debug!("🔍 添加文本输入 ({} 字符)", text.chars().count());
        items.push(text);
    }

    let usable: Vec<&str> = documents
        .iter()
        .filter(|d| d.is_ok() && has_content(&d.text))
        .map(|d| d.text.as_str())
        .collect();
    if !usable.is_empty() {
        debug!("🔍 添加 {} 个文档", usable.len());
    }
    items.extend(usable);

    if items.is_empty() {
        debug!("🔍 没有任何输入");
        return Err(ValidationError::NoInput);
    }

    let combined = items.join(SEPARATOR);
    debug!("🔍 合并后输入长度: {} 字符", combined.chars().count());

    Ok(CombinedDocument::new(combined, items.len()))
}

fn has_content(s: &str) -> bool {
    !s.is_empty()
}
