pub mod file_loader;

pub use file_loader::{load_upload, load_uploads};
