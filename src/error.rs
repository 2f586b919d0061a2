use std::time::Duration;
use thiserror::Error;

/// 应用程序错误类型
///
/// 单个文档的提取失败不属于这里，它们记录在 `ExtractionStatus` 中，
/// 不会中断整个生成请求。
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误（不会调用模型）
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// 模型网关错误
    #[error("模型服务错误: {0}")]
    Gateway(#[from] GatewayError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 所有输入源均为空
    #[error("no input provided: at least one input (texts, documents, or feature_document) is required")]
    NoInput,
    /// 聊天提示词为空
    #[error("Prompt cannot be empty")]
    EmptyPrompt,
}

/// 模型网关错误
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 网络请求失败
    #[error("请求模型 {model} 失败: {source}")]
    Transport {
        model: String,
        #[source]
        source: reqwest::Error,
    },
    /// 请求超时
    #[error("请求模型 {model} 超时 ({timeout:?})")]
    Timeout { model: String, timeout: Duration },
    /// 认证失败（401 / 403）
    #[error("模型服务认证失败 (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },
    /// 请求频率限制
    #[error("模型服务请求频率限制, 建议等待: {retry_after:?}秒")]
    Throttled { retry_after: Option<u64> },
    /// 服务返回错误响应
    #[error("模型服务返回错误 (HTTP {status}): {message}")]
    Service { status: u16, message: String },
    /// 端点地址无法解析
    #[error("Bedrock 端点地址无效 ({endpoint}): {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    /// 响应结构不符合约定（缺少 content[0].text 等）
    #[error("模型服务响应格式错误: {reason}")]
    MalformedResponse { reason: String },
}

impl GatewayError {
    /// 是否为响应结构错误（与传输 / 服务端错误区分）
    pub fn is_malformed(&self) -> bool {
        matches!(self, GatewayError::MalformedResponse { .. })
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 上传文件过大
    #[error("文件 {name} 过大: {size} 字节 (上限 {limit} 字节)")]
    TooLarge { name: String, size: usize, limit: usize },
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
