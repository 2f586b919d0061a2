use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::error::ApiError;
use crate::api::types::{
    ApiState, ChatRequest, ChatResponse, DocumentReport, TestPlanRequest, TestPlanResponse,
    UploadResponse,
};
use crate::error::FileError;
use crate::models::{RawInput, UploadedFile};
use crate::workflow::GenerationRequest;

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `POST /chat`
pub async fn chat(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let response = state.flow.chat(&req.prompt).await?;
    Ok(Json(ChatResponse { response }))
}

/// `POST /test-plan`
///
/// 返回模型原始文本，解析交给调用方
pub async fn test_plan(
    State(state): State<ApiState>,
    payload: Result<Json<TestPlanRequest>, JsonRejection>,
) -> Result<Json<TestPlanResponse>, ApiError> {
    let Json(req) = payload?;
    let outcome = state.flow.generate(req.into()).await?;
    Ok(Json(TestPlanResponse {
        test_plan: outcome.raw_text,
    }))
}

/// `POST /test-plan/upload`
///
/// multipart 字段：`feature_document`、可重复的 `text`、可重复的 `file`
pub async fn upload(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut request = GenerationRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "feature_document" => request.feature_document = Some(field.text().await?),
            "text" => request.push(RawInput::Text(field.text().await?)),
            "file" => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = match field.content_type() {
                    Some(ct) => ct.to_string(),
                    None => mime_guess::from_path(&name)
                        .first_or_octet_stream()
                        .essence_str()
                        .to_string(),
                };
                let bytes = field.bytes().await?;
                if bytes.len() > state.max_upload_bytes {
                    return Err(FileError::TooLarge {
                        name,
                        size: bytes.len(),
                        limit: state.max_upload_bytes,
                    }
                    .into());
                }
                info!("📄 收到文件: {} ({}, {} 字节)", name, mime_type, bytes.len());
                request.push(RawInput::File(UploadedFile::new(name, mime_type, bytes.to_vec())));
            }
            other => warn!("⚠️ 忽略未知字段: {}", other),
        }
    }

    let outcome = state.flow.generate(request).await?;
    Ok(Json(UploadResponse {
        documents: outcome.documents.iter().map(DocumentReport::from).collect(),
        test_plan: outcome.plan,
    }))
}
