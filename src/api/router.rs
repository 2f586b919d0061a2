use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::handlers;
use crate::api::types::ApiState;

/// 整个 multipart 请求体的上限为单文件上限的倍数
const BODY_LIMIT_FACTOR: usize = 4;

/// 构建 HTTP 路由
pub fn build_router(state: ApiState) -> Router {
    let body_limit = state.max_upload_bytes.saturating_mul(BODY_LIMIT_FACTOR);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/test-plan", post(handlers::test_plan))
        .route("/test-plan/upload", post(handlers::upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
