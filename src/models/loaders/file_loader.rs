use crate::error::{AppError, AppResult, FileError};
use crate::models::input::UploadedFile;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从磁盘读取一个待上传文件，MIME 类型按扩展名推断
///
/// 文件内容一次性读完；超过 `max_bytes` 的文件直接报错
pub async fn load_upload(path: &Path, max_bytes: usize) -> AppResult<UploadedFile> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    if bytes.len() > max_bytes {
        return Err(AppError::File(FileError::TooLarge {
            name,
            size: bytes.len(),
            limit: max_bytes,
        }));
    }

    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    tracing::info!("正在加载: {} ({}, {} 字节)", name, mime_type, bytes.len());

    Ok(UploadedFile::new(name, mime_type, bytes))
}

/// 并发读取多个文件，保持传入顺序
pub async fn load_uploads(paths: &[PathBuf], max_bytes: usize) -> AppResult<Vec<UploadedFile>> {
    let results = join_all(paths.iter().map(|p| load_upload(p, max_bytes))).await;
    results.into_iter().collect()
}
