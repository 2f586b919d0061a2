//! 请求 / 响应结构
//!
//! `texts` 与 `documents` 既可以是单个字符串也可以是列表；
//! 列表中的非字符串值按 JSON 文本参与合并。

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{ExtractedDocument, ExtractionStatus, TestPlan};
use crate::workflow::{GenerationFlow, GenerationRequest};

/// 上传报告中预览的最大字符数
pub const PREVIEW_CHARS: usize = 500;

/// 路由共享状态
#[derive(Clone)]
pub struct ApiState {
    pub flow: Arc<GenerationFlow>,
    pub max_upload_bytes: usize,
}

impl ApiState {
    pub fn new(flow: Arc<GenerationFlow>, max_upload_bytes: usize) -> Self {
        Self {
            flow,
            max_upload_bytes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TestPlanRequest {
    #[serde(default, deserialize_with = "one_or_many")]
    pub texts: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub documents: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub feature_document: Option<String>,
}

impl From<TestPlanRequest> for GenerationRequest {
    fn from(req: TestPlanRequest) -> Self {
        GenerationRequest {
            feature_document: req.feature_document,
            texts: req.texts,
            documents: req.documents,
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TestPlanResponse {
    pub test_plan: String,
}

/// 上传接口的响应：解析后的计划 + 每个文件的提取报告
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub test_plan: TestPlan,
    pub documents: Vec<DocumentReport>,
}

#[derive(Debug, Serialize)]
pub struct DocumentReport {
    pub source_name: String,
    #[serde(flatten)]
    pub status: ExtractionStatus,
    pub char_count: usize,
    pub preview: String,
}

impl From<&ExtractedDocument> for DocumentReport {
    fn from(doc: &ExtractedDocument) -> Self {
        Self {
            source_name: doc.source_name.clone(),
            status: doc.status.clone(),
            char_count: doc.char_count(),
            preview: doc.preview(PREVIEW_CHARS),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().filter_map(stringify).collect(),
        Some(other) => stringify(other).into_iter().collect(),
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(stringify))
}

fn stringify(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
