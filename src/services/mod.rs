pub mod aggregator;
pub mod extractor;
pub mod prompt_builder;
pub mod response_parser;

pub use aggregator::aggregate;
pub use extractor::DocumentExtractor;
pub use prompt_builder::{build_prompt, PromptTemplate};
pub use response_parser::parse;
