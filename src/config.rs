use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError, FileError};

/// 程序配置文件
///
/// 读取顺序：默认值 → TOML 文件（可选） → 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- Bedrock 配置 ---
    /// AWS 区域
    pub aws_region: String,
    /// Bedrock runtime 端点（为空时按区域推导）
    pub bedrock_endpoint: Option<String>,
    /// Bedrock API Key（Bearer token）
    pub bedrock_api_key: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 聊天调用点 ---
    pub chat_model_id: String,
    pub chat_max_tokens: u32,
    // --- 测试计划调用点 ---
    pub test_plan_model_id: String,
    pub test_plan_max_tokens: u32,
    /// 提示词是否额外要求 uat_test_cases
    pub include_uat_cases: bool,
    // --- HTTP 服务 ---
    pub server_host: String,
    pub server_port: u16,
    /// 单个上传文件的大小上限（字节）
    pub max_upload_bytes: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws_region: "us-east-1".to_string(),
            bedrock_endpoint: None,
            bedrock_api_key: String::new(),
            request_timeout_secs: 120,
            chat_model_id: "anthropic.claude-3-sonnet-20240229-v1:0".to_string(),
            chat_max_tokens: 1000,
            test_plan_model_id: "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string(),
            test_plan_max_tokens: 4000,
            include_uat_cases: true,
            server_host: "0.0.0.0".to_string(),
            server_port: 8000,
            max_upload_bytes: 20 * 1024 * 1024,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载（在默认值之上覆盖）
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 从 TOML 文件加载，再应用环境变量覆盖
    ///
    /// 文件不存在时退回默认值
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_toml_file(path)?,
            Some(path) => {
                tracing::warn!("配置文件 {} 不存在，使用默认配置", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|source| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            })
        })
    }

    /// 按给定的查找函数应用环境变量覆盖
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AWS_REGION") {
            self.aws_region = v;
        }
        if let Some(v) = lookup("BEDROCK_ENDPOINT") {
            self.bedrock_endpoint = Some(v);
        }
        if let Some(v) = lookup("AWS_BEARER_TOKEN_BEDROCK") {
            self.bedrock_api_key = v;
        }
        if let Some(v) = lookup("CHAT_MODEL_ID") {
            self.chat_model_id = v;
        }
        if let Some(v) = lookup("TEST_PLAN_MODEL_ID") {
            self.test_plan_model_id = v;
        }
        if let Some(v) = lookup("SERVER_HOST") {
            self.server_host = v;
        }
        parse_env(&lookup, "REQUEST_TIMEOUT_SECS", "u64", &mut self.request_timeout_secs)?;
        parse_env(&lookup, "CHAT_MAX_TOKENS", "u32", &mut self.chat_max_tokens)?;
        parse_env(&lookup, "TEST_PLAN_MAX_TOKENS", "u32", &mut self.test_plan_max_tokens)?;
        parse_env(&lookup, "INCLUDE_UAT_CASES", "bool", &mut self.include_uat_cases)?;
        parse_env(&lookup, "SERVER_PORT", "u16", &mut self.server_port)?;
        parse_env(&lookup, "MAX_UPLOAD_BYTES", "usize", &mut self.max_upload_bytes)?;
        parse_env(&lookup, "VERBOSE_LOGGING", "bool", &mut self.verbose_logging)?;
        Ok(())
    }

    /// 实际使用的 Bedrock runtime 端点
    pub fn endpoint(&self) -> String {
        match &self.bedrock_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", self.aws_region),
        }
    }

    /// 服务监听地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_env<F, T>(lookup: &F, var_name: &str, expected_type: &str, slot: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(value) = lookup(var_name) {
        *slot = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value: value.clone(),
                expected_type: expected_type.to_string(),
            })?;
    }
    Ok(())
}
