//! # TestBuddy
//!
//! 根据需求文档（PDF / DOCX / 纯文本）调用 Bedrock 上的 Claude 模型生成结构化测试计划
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 持有远程连接，只暴露调用能力
//! - `ModelGateway` - 一次模型调用的边界
//! - `BedrockClient` - InvokeModel 的 HTTP 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，互不依赖
//! - `DocumentExtractor` - 文件 → 文本
//! - `aggregate` - 多个输入合并为一份文档
//! - `PromptTemplate` - 文档 → 提示词
//! - `response_parser` - 模型输出 → 测试计划（失败退化为原始文本）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次请求"的完整处理流程
//! - `GenerationFlow` - 提取 → 合并 → 提示词 → 模型 → 解析
//!
//! ### ④ 接入层
//! - `api/` - HTTP 接口（axum）
//! - `cli` / `app` - 命令行入口
//! - `presentation/` - 计划视图、会话状态与终端输出
//!
//! ## 模块结构

pub mod api;
pub mod app;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod presentation;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{BedrockClient, ModelGateway};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ExtractedDocument, TestPlan, UploadedFile};
pub use workflow::{GenerationFlow, GenerationOutcome, GenerationRequest};
