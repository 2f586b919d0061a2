pub mod bedrock_client;

pub use bedrock_client::{BedrockClient, InvokeRequest, ModelGateway, ANTHROPIC_VERSION};
