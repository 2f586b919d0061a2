/// Bedrock 模型网关
///
/// 封装一次 InvokeModel 调用：请求体为 Anthropic messages 信封，
/// 响应中只取 `content[0].text`。不做重试，错误直接返回给调用方。
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GatewayError;
use crate::models::{ModelResponse, Prompt};

/// 协议版本
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// 模型网关：一次远程调用的边界
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(
        &self,
        prompt: &Prompt,
        max_tokens: u32,
        model_id: &str,
    ) -> Result<ModelResponse, GatewayError>;
}

/// 请求信封
#[derive(Debug, Serialize)]
pub struct InvokeRequest<'a> {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub messages: Vec<InvokeMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct InvokeMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> InvokeRequest<'a> {
    /// 提示词作为唯一的一条 user 消息
    pub fn new(prompt: &'a Prompt, max_tokens: u32) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens,
            messages: vec![InvokeMessage {
                role: "user",
                content: prompt.as_str(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Bedrock runtime 客户端
///
/// 只持有连接配置，可在多个请求之间只读共享
pub struct BedrockClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    timeout: Duration,
}

impl BedrockClient {
    /// 创建新的 Bedrock 客户端
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| GatewayError::Transport {
                model: String::new(),
                source,
            })?;

        let endpoint = parse_endpoint(&config.endpoint())?;

        if config.bedrock_api_key.is_empty() {
            warn!("未配置 AWS_BEARER_TOKEN_BEDROCK，调用模型将会认证失败");
        }

        Ok(Self {
            http,
            endpoint,
            api_key: config.bedrock_api_key.clone(),
            timeout,
        })
    }

    /// `{endpoint}/model/{modelId}/invoke`，模型 ID 作为单个路径段转义
    ///
    /// 推理配置文件的 ARN 中含有 `/`，必须编码为 `%2F`
    fn invoke_url(&self, model_id: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["model", model_id, "invoke"]);
        }
        url
    }
}

#[async_trait]
impl ModelGateway for BedrockClient {
    async fn invoke(
        &self,
        prompt: &Prompt,
        max_tokens: u32,
        model_id: &str,
    ) -> Result<ModelResponse, GatewayError> {
        debug!(
            "正在调用 Bedrock，模型: {}，max_tokens: {}，提示词 {} 字符",
            model_id,
            max_tokens,
            prompt.as_str().chars().count()
        );

        let body = InvokeRequest::new(prompt, max_tokens);
        let response = self
            .http
            .post(self.invoke_url(model_id))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|source| self.transport_error(model_id, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(model_id, source))?;

        let text = extract_text(&bytes)?;
        debug!("Bedrock 调用成功，响应 {} 字符", text.chars().count());

        Ok(ModelResponse::new(text))
    }
}

impl BedrockClient {
    fn transport_error(&self, model_id: &str, source: reqwest::Error) -> GatewayError {
        warn!("Bedrock 调用失败: {}", source);
        if source.is_timeout() {
            GatewayError::Timeout {
                model: model_id.to_string(),
                timeout: self.timeout,
            }
        } else {
            GatewayError::Transport {
                model: model_id.to_string(),
                source,
            }
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, GatewayError> {
    let url = Url::parse(endpoint).map_err(|e| GatewayError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(GatewayError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: "not a base URL".to_string(),
        });
    }
    Ok(url)
}

async fn status_error(status: StatusCode, response: reqwest::Response) -> GatewayError {
    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok());
    let message = response.text().await.unwrap_or_default();
    warn!("Bedrock 返回错误 (HTTP {}): {}", status.as_u16(), message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Authentication {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => GatewayError::Throttled { retry_after },
        _ => GatewayError::Service {
            status: status.as_u16(),
            message,
        },
    }
}

/// 从响应体中取出 `content[0].text`
fn extract_text(body: &[u8]) -> Result<String, GatewayError> {
    let parsed: InvokeResponse =
        serde_json::from_slice(body).map_err(|e| GatewayError::MalformedResponse {
            reason: format!("response body is not the expected JSON envelope: {}", e),
        })?;

    parsed
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| GatewayError::MalformedResponse {
            reason: "missing content[0].text".to_string(),
        })
}
