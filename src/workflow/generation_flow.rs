//! 生成流程 - 流程层
//!
//! 核心职责：定义"一次请求"的完整处理流程
//!
//! 流程顺序：
//! 1. 文档提取（单个失败只产生警告）
//! 2. 输入合并（全部为空则直接返回校验错误，不调用模型）
//! 3. 构建提示词
//! 4. 调用模型网关（失败则整个请求失败）
//! 5. 解析响应（失败退化为原始文本）

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::{self, JoinError};
use tracing::{debug, error, info, warn};

use crate::clients::ModelGateway;
use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::models::{ExtractedDocument, Prompt, RawInput, TestPlan, UploadedFile};
use crate::services::{aggregate, response_parser, DocumentExtractor, PromptTemplate};

/// 一个调用点的模型参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSettings {
    pub model_id: String,
    pub max_tokens: u32,
}

impl ModelSettings {
    pub fn new(model_id: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model_id: model_id.into(),
            max_tokens,
        }
    }
}

/// 一次测试计划生成请求
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    /// 显式的 feature document 字段
    pub feature_document: Option<String>,
    /// 自由文本（按提交顺序）
    pub texts: Vec<String>,
    /// 已经是文本形式的文档（按上传顺序，排在文件之前）
    pub documents: Vec<String>,
    /// 待提取的上传文件（按上传顺序）
    pub files: Vec<UploadedFile>,
}

impl GenerationRequest {
    /// 按提交顺序追加一条原始输入
    pub fn push(&mut self, input: RawInput) {
        match input {
            RawInput::Text(text) => self.texts.push(text),
            RawInput::File(file) => self.files.push(file),
        }
    }

    /// 请求中是否没有任何输入项（不检查内容是否为空白）
    pub fn is_empty(&self) -> bool {
        self.feature_document.is_none()
            && self.texts.is_empty()
            && self.documents.is_empty()
            && self.files.is_empty()
    }
}

impl FromIterator<RawInput> for GenerationRequest {
    fn from_iter<I: IntoIterator<Item = RawInput>>(iter: I) -> Self {
        let mut request = Self::default();
        for input in iter {
            request.push(input);
        }
        request
    }
}

/// 一次生成的结果
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// 模型原始输出
    pub raw_text: String,
    /// 解析后的测试计划
    pub plan: TestPlan,
    /// 每个上传文件的提取结果（含失败的）
    pub documents: Vec<ExtractedDocument>,
}

impl GenerationOutcome {
    /// 所有提取失败文件的警告
    pub fn warnings(&self) -> Vec<String> {
        self.documents.iter().filter_map(|d| d.warning()).collect()
    }
}

/// 生成流程
///
/// - 编排提取 → 合并 → 提示词 → 模型 → 解析
/// - 只持有网关的共享引用，不持有请求状态
/// - 可被多个并发请求共享
pub struct GenerationFlow {
    gateway: Arc<dyn ModelGateway>,
    extractor: DocumentExtractor,
    template: PromptTemplate,
    chat: ModelSettings,
    test_plan: ModelSettings,
}

impl GenerationFlow {
    /// 创建新的生成流程
    pub fn new(config: &Config, gateway: Arc<dyn ModelGateway>) -> Self {
        Self {
            gateway,
            extractor: DocumentExtractor::new(),
            template: PromptTemplate::from_include_uat(config.include_uat_cases),
            chat: ModelSettings::new(&config.chat_model_id, config.chat_max_tokens),
            test_plan: ModelSettings::new(&config.test_plan_model_id, config.test_plan_max_tokens),
        }
    }

    pub fn chat_settings(&self) -> &ModelSettings {
        &self.chat
    }

    pub fn test_plan_settings(&self) -> &ModelSettings {
        &self.test_plan
    }

    /// 自由对话：一次模型调用，返回原始文本
    pub async fn chat(&self, prompt: &str) -> AppResult<String> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(ValidationError::EmptyPrompt.into());
        }

        let response = self
            .gateway
            .invoke(&Prompt::new(prompt), self.chat.max_tokens, &self.chat.model_id)
            .await
            .map_err(|e| {
                error!("❌ 对话调用失败: {}", e);
                e
            })?;

        Ok(response.raw_text)
    }

    /// 提取所有上传文件
    ///
    /// 解析是 CPU 密集的同步操作，每个文件放到阻塞线程池中执行，结果保持上传顺序
    pub async fn extract_all(&self, files: Vec<UploadedFile>) -> Vec<ExtractedDocument> {
        let tasks = files.into_iter().map(|file| {
            let extractor = self.extractor;
            async move {
                let name = file.name.clone();
                task::spawn_blocking(move || extractor.extract(&file))
                    .await
                    .unwrap_or_else(|e| aborted_extraction(name, e))
            }
        });

        let documents = join_all(tasks).await;
        for warning in documents.iter().filter_map(|d| d.warning()) {
            warn!("⚠️ {}", warning);
        }
        documents
    }

    /// 生成测试计划
    pub async fn generate(&self, request: GenerationRequest) -> AppResult<GenerationOutcome> {
        info!("🔍 开始生成测试计划");

        let GenerationRequest {
            feature_document,
            texts,
            documents: inline_documents,
            files,
        } = request;

        let extracted = self.extract_all(files).await;

        let mut documents: Vec<ExtractedDocument> = inline_documents
            .into_iter()
            .enumerate()
            .map(|(i, text)| ExtractedDocument::ok(format!("documents[{}]", i), text))
            .collect();
        documents.extend(extracted.iter().cloned());

        let combined = aggregate(feature_document.as_deref(), &texts, &documents)?;

        let prompt = self.template.build_prompt(&combined);
        debug!("🔍 提示词已准备 ({} 字符)", prompt.as_str().chars().count());

        info!(
            "🤖 调用模型 {} (max_tokens: {})...",
            self.test_plan.model_id, self.test_plan.max_tokens
        );
        let response = self
            .gateway
            .invoke(&prompt, self.test_plan.max_tokens, &self.test_plan.model_id)
            .await
            .map_err(|e| {
                if e.is_malformed() {
                    error!("❌ 模型响应结构不符合约定: {}", e);
                } else {
                    error!("❌ 模型调用失败: {}", e);
                }
                e
            })?;
        info!("✓ 模型调用成功，响应 {} 字符", response.raw_text.chars().count());

        let plan = response_parser::parse(&response.raw_text);

        Ok(GenerationOutcome {
            raw_text: response.raw_text,
            plan,
            documents: extracted,
        })
    }
}

/// 提取任务本身异常退出时，记为该文件的提取错误
fn aborted_extraction(name: String, err: JoinError) -> ExtractedDocument {
    error!("❌ 文件 {} 的提取任务异常退出: {}", name, err);
    ExtractedDocument::failed(name, format!("extraction task aborted: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, GatewayError};
    use crate::models::{ExtractionStatus, ModelResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// 记录调用参数并返回固定结果的假网关
    struct FakeGateway {
        reply: Result<String, u16>,
        calls: Mutex<Vec<(String, u32, String)>>,
    }

    impl FakeGateway {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, u32, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelGateway for FakeGateway {
        async fn invoke(
            &self,
            prompt: &Prompt,
            max_tokens: u32,
            model_id: &str,
        ) -> Result<ModelResponse, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.as_str().to_string(), max_tokens, model_id.to_string()));
            match &self.reply {
                Ok(text) => Ok(ModelResponse::new(text.clone())),
                Err(status) => Err(GatewayError::Service {
                    status: *status,
                    message: "boom".to_string(),
                }),
            }
        }
    }

    fn flow(gateway: Arc<FakeGateway>) -> GenerationFlow {
        GenerationFlow::new(&Config::default(), gateway)
    }

    #[test]
    fn test_empty_request_makes_no_calls() {
        let gateway = FakeGateway::replying("{}");
        let flow = flow(gateway.clone());

        let request = GenerationRequest {
            feature_document: Some(String::new()),
            ..Default::default()
        };
        let err = tokio_test::block_on(flow.generate(request)).unwrap_err();

        assert!(matches!(err, AppError::Validation(ValidationError::NoInput)));
        assert!(gateway.calls().is_empty());
    }

    #[test]
    fn test_only_unsupported_files_makes_no_calls() {
        let gateway = FakeGateway::replying("{}");
        let flow = flow(gateway.clone());

        let request = GenerationRequest {
            files: vec![UploadedFile::new("a.png", "image/png", vec![1, 2, 3])],
            ..Default::default()
        };
        let err = tokio_test::block_on(flow.generate(request)).unwrap_err();

        assert!(matches!(err, AppError::Validation(ValidationError::NoInput)));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_generate_uses_test_plan_settings() {
        let gateway = FakeGateway::replying(r#"{"test_types": []}"#);
        let flow = flow(gateway.clone());

        let outcome = flow
            .generate(GenerationRequest {
                feature_document: Some("Login must support OAuth".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(outcome.plan.is_structured());
        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.contains("Feature Document:\n    Login must support OAuth\n"));
        assert_eq!(calls[0].1, 4000);
        assert_eq!(calls[0].2, "anthropic.claude-3-5-sonnet-20240620-v1:0");
    }

    #[tokio::test]
    async fn test_generate_keeps_failed_documents_as_warnings() {
        let gateway = FakeGateway::replying("not json");
        let flow = flow(gateway.clone());

        let outcome = flow
            .generate(GenerationRequest {
                texts: vec!["text input".to_string()],
                documents: vec!["inline doc".to_string()],
                files: vec![
                    UploadedFile::new("a.txt", "text/plain", b"file doc".to_vec()),
                    UploadedFile::new("b.bin", "application/octet-stream", vec![0]),
                ],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome.plan, TestPlan::raw("not json"));
        assert_eq!(outcome.documents.len(), 2);
        assert_eq!(outcome.warnings(), vec!["b.bin: Unsupported file format".to_string()]);
        assert!(gateway.calls()[0]
            .0
            .contains("text input\n\ninline doc\n\nfile doc"));
    }

    #[tokio::test]
    async fn test_gateway_failure_aborts_request() {
        let gateway = FakeGateway::failing(500);
        let flow = flow(gateway.clone());

        let err = flow
            .generate(GenerationRequest {
                texts: vec!["x".to_string()],
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Gateway(GatewayError::Service { status: 500, .. })));
        assert_eq!(gateway.calls().len(), 1);
    }

    #[test]
    fn test_request_from_raw_inputs_keeps_order() {
        let request: GenerationRequest = vec![
            RawInput::Text("first".to_string()),
            RawInput::File(UploadedFile::new("a.txt", "text/plain", b"x".to_vec())),
            RawInput::Text("second".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(request.texts, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(request.files.len(), 1);
        assert!(!request.is_empty());
        assert!(GenerationRequest::default().is_empty());
    }

    #[tokio::test]
    async fn test_extract_all_keeps_upload_order() {
        let flow = flow(FakeGateway::replying("unused"));
        let documents = flow
            .extract_all(vec![
                UploadedFile::new("b.txt", "text/plain", b"second".to_vec()),
                UploadedFile::new("x.bin", "application/octet-stream", vec![0]),
                UploadedFile::new("a.txt", "text/plain", b"first".to_vec()),
            ])
            .await;

        let names: Vec<&str> = documents.iter().map(|d| d.source_name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "x.bin", "a.txt"]);
        assert_eq!(documents[0].text, "second");
        assert!(!documents[1].is_ok());
        assert_eq!(documents[2].text, "first");
    }

    #[tokio::test]
    async fn test_aborted_extraction_task_is_per_file_error() {
        let err = task::spawn_blocking(|| panic!("parser blew up"))
            .await
            .unwrap_err();
        let doc = aborted_extraction("broken.pdf".to_string(), err);

        assert_eq!(doc.source_name, "broken.pdf");
        assert!(matches!(doc.status, ExtractionStatus::ExtractionError(_)));
        assert!(doc.warning().unwrap().starts_with("broken.pdf: Error reading file:"));
    }

    #[tokio::test]
    async fn test_chat_uses_chat_settings() {
        let gateway = FakeGateway::replying("hi there");
        let flow = flow(gateway.clone());

        assert_eq!(flow.chat("  hello  ").await.unwrap(), "hi there");
        let calls = gateway.calls();
        assert_eq!(calls[0].0, "hello");
        assert_eq!(calls[0].1, 1000);
        assert_eq!(calls[0].2, "anthropic.claude-3-sonnet-20240229-v1:0");
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_prompt() {
        let gateway = FakeGateway::replying("unused");
        let flow = flow(gateway.clone());

        let err = flow.chat("   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::EmptyPrompt)));
        assert!(gateway.calls().is_empty());
    }
}
