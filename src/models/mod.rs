pub mod document;
pub mod exchange;
pub mod input;
pub mod loaders;
pub mod test_plan;

pub use document::{CombinedDocument, ExtractedDocument, ExtractionStatus};
pub use exchange::{ModelResponse, Prompt};
pub use input::{RawInput, UploadedFile};
pub use loaders::{load_upload, load_uploads};
pub use test_plan::TestPlan;
