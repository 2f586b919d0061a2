use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::{build_router, ApiState};
use crate::cli::{Command, GenerateArgs};
use crate::clients::{BedrockClient, ModelGateway};
use crate::config::Config;
use crate::models::{load_uploads, TestPlan};
use crate::presentation::{render_plan, PlanSession, PlanView};
use crate::utils::logging::{log_generation_summary, log_startup};
use crate::workflow::{GenerationFlow, GenerationOutcome, GenerationRequest};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<GenerationFlow>,
}

impl App {
    /// 初始化应用：创建唯一的 Bedrock 客户端并共享给流程
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let client = BedrockClient::new(&config).context("创建 Bedrock 客户端失败")?;
        Ok(Self::with_gateway(config, Arc::new(client)))
    }

    /// 使用指定的网关创建应用
    pub fn with_gateway(config: Config, gateway: Arc<dyn ModelGateway>) -> Self {
        let flow = Arc::new(GenerationFlow::new(&config, gateway));
        Self { config, flow }
    }

    pub fn flow(&self) -> Arc<GenerationFlow> {
        self.flow.clone()
    }

    /// 运行一条命令
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Serve => self.serve().await,
            Command::Generate(args) => self.generate(args).await,
            Command::Chat { prompt } => self.chat(&prompt).await,
        }
    }

    /// 启动 HTTP 服务
    async fn serve(&self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("无法监听 {}", addr))?;

        let router = build_router(ApiState::new(self.flow(), self.config.max_upload_bytes));
        info!("🌐 HTTP 服务已启动: http://{}", addr);

        axum::serve(listener, router)
            .await
            .context("HTTP 服务异常退出")?;
        Ok(())
    }

    /// 生成测试计划并输出到终端
    async fn generate(&self, args: GenerateArgs) -> Result<()> {
        let outcome = self.generate_outcome(&args).await?;

        let view = PlanView::from_plan(&outcome.plan);
        let session = plan_session(&outcome.plan, &view, &args);
        log_generation_summary(
            outcome.plan.is_structured(),
            view.test_case_count(),
            outcome.warnings().len(),
        );

        if args.json {
            println!("{}", serde_json::to_string_pretty(&outcome.plan)?);
        } else {
            print!("{}", render_plan(&view, Some(&session)));
        }
        Ok(())
    }

    /// 读取文件并运行生成流程
    pub async fn generate_outcome(&self, args: &GenerateArgs) -> Result<GenerationOutcome> {
        let files = load_uploads(&args.files, self.config.max_upload_bytes)
            .await
            .context("读取上传文件失败")?;

        let request = GenerationRequest {
            feature_document: args.feature_document.clone(),
            texts: args.texts.clone(),
            documents: Vec::new(),
            files,
        };

        self.flow.generate(request).await.map_err(|e| {
            error!("❌ 生成测试计划失败: {}", e);
            anyhow::Error::new(e)
        })
    }

    async fn chat(&self, prompt: &str) -> Result<()> {
        let response = self.flow.chat(prompt).await?;
        println!("{}", response);
        Ok(())
    }
}

/// 用新计划建立会话，并应用命令行给出的完成与展开状态
fn plan_session(plan: &TestPlan, view: &PlanView, args: &GenerateArgs) -> PlanSession {
    let mut session = PlanSession::new();
    session.set_plan(plan.clone());

    for key in &args.done {
        if !session.is_completed(key) {
            session.toggle_completed(key.clone());
        }
    }

    let sections: Vec<&str> = match view {
        PlanView::Structured { test_types, .. } if args.expand_all => {
            test_types.iter().map(|t| t.type_name.as_str()).collect()
        }
        _ => args.expand.iter().map(String::as_str).collect(),
    };
    for section in sections {
        if !session.is_expanded(section) {
            session.toggle_expanded(section);
        }
    }
    session
}
