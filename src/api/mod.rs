//! HTTP 接口层
//!
//! 只做请求解析与错误映射，所有业务都交给 `GenerationFlow`

pub mod error;
pub mod handlers;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::build_router;
pub use types::ApiState;
