//! Persisting uploaded files to the local filesystem.
//!
//! [`UploadHandler`] is the single place where uploaded bytes reach disk. Every request adapter
//! in [`crate::api::handlers::uploads`] converts its request into an [`UploadedFile`] and hands it
//! to [`UploadHandler::save`], which always answers with an [`UploadResult`]; write failures are
//! logged and folded into the result rather than returned.
//!
//! The destination file name is the final path segment of the client-supplied name, so
//! `C:\temp\photo.png` and `uploads/photo.png` both land as `photo.png` inside the configured
//! destination directory. Existing files are overwritten and writes are not staged, so a failed
//! write may leave a truncated file behind.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, instrument};

use crate::api::models::uploads::{UploadResult, UploadedFile};
use crate::errors::{Error, Result};

/// Returns the part of `raw` after the last `/` or `\`, or all of it when there is no separator.
pub fn resolve_file_name(raw: &str) -> &str {
    match raw.rfind(['/', '\\']) {
        Some(idx) => &raw[idx + 1..],
        None => raw,
    }
}

/// Writes uploaded files into a fixed destination directory.
#[derive(Debug, Clone)]
pub struct UploadHandler {
    destination_dir: PathBuf,
}

impl UploadHandler {
    pub fn new(destination_dir: impl Into<PathBuf>) -> Self {
        Self {
            destination_dir: destination_dir.into(),
        }
    }

    pub fn destination_dir(&self) -> &Path {
        &self.destination_dir
    }

    /// Save `file` under the final segment of its submitted name.
    pub async fn save(&self, file: UploadedFile) -> UploadResult {
        let name = resolve_file_name(&file.original_name).to_string();
        self.store(name, file.content).await
    }

    /// Save `file` under its submitted name verbatim, separators included.
    ///
    /// Only reachable through `upload.legacy_part_names`.
    pub async fn save_raw(&self, file: UploadedFile) -> UploadResult {
        self.store(file.original_name, file.content).await
    }

    #[instrument(skip(self, content), fields(size = content.len()))]
    async fn store(&self, file_name: String, content: Bytes) -> UploadResult {
        match self.write(&file_name, &content).await {
            Ok(destination) => {
                let result = UploadResult::succeeded(&file_name);
                info!(path = %destination.display(), "{}", result.message());
                result
            }
            Err(err) => {
                error!("{}: {}", err.user_message(), err);
                UploadResult::failed(err.user_message())
            }
        }
    }

    /// Write `content` to `file_name` inside the destination directory.
    ///
    /// The handle is dropped before returning on both paths.
    async fn write(&self, file_name: &str, content: &[u8]) -> Result<PathBuf> {
        let destination = self.destination_dir.join(file_name);
        let io_err = |source| Error::Io {
            file_name: file_name.to_string(),
            source,
        };

        let mut file = tokio::fs::File::create(&destination).await.map_err(io_err)?;
        file.write_all(content).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_file_name() {
        assert_eq!(resolve_file_name("report.pdf"), "report.pdf");
        assert_eq!(resolve_file_name("C:\\temp\\photo.png"), "photo.png");
        assert_eq!(resolve_file_name("a/b/c.txt"), "c.txt");
        assert_eq!(resolve_file_name("mixed\\dir/name.bin"), "name.bin");
        assert_eq!(resolve_file_name("dir/"), "");
        assert_eq!(resolve_file_name(""), "");
    }

    #[tokio::test]
    async fn test_save_round_trips_content() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());
        let content = b"%PDF-1.4 fake document body".to_vec();

        let result = handler.save(UploadedFile::new("report.pdf", content.clone())).await;

        assert_eq!(result, UploadResult::succeeded("report.pdf"));
        assert_eq!(result.message(), "report.pdf uploaded successfully");
        let written = std::fs::read(dir.path().join("report.pdf")).unwrap();
        assert_eq!(written, content);
    }

    #[tokio::test]
    async fn test_save_strips_client_directories() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());

        let result = handler.save(UploadedFile::new("C:\\temp\\photo.png", &b"png"[..])).await;

        assert!(result.success());
        assert_eq!(result.message(), "photo.png uploaded successfully");
        assert_eq!(std::fs::read(dir.path().join("photo.png")).unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());
        std::fs::write(dir.path().join("notes.txt"), b"old contents that are longer").unwrap();

        let result = handler.save(UploadedFile::new("notes.txt", &b"new"[..])).await;

        assert!(result.success());
        assert_eq!(std::fs::read(dir.path().join("notes.txt")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_save_accepts_empty_content() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());

        let result = handler.save(UploadedFile::new("empty.txt", Vec::new())).await;

        assert!(result.success());
        assert!(std::fs::read(dir.path().join("empty.txt")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_reports_failure_when_destination_missing() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path().join("does-not-exist"));

        let result = handler.save(UploadedFile::new("report.pdf", &b"%PDF-1.4"[..])).await;

        assert!(!result.success());
        assert_eq!(result.message(), "report.pdf upload failed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_save_reports_failure_for_directory_name() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());

        let result = handler.save(UploadedFile::new("nested/", &b"data"[..])).await;

        assert!(!result.success());
        assert_eq!(result.message(), " upload failed");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_save_raw_keeps_submitted_name() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());

        let result = handler.save_raw(UploadedFile::new("C:\\temp\\photo.png", &b"png"[..])).await;

        assert!(result.success());
        assert_eq!(result.message(), "C:\\temp\\photo.png uploaded successfully");
        assert!(dir.path().join("C:\\temp\\photo.png").exists());
    }

    #[tokio::test]
    async fn test_write_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path().join("missing"));

        let err = handler.write("report.pdf", b"x").await.unwrap_err();

        match err {
            Error::Io { file_name, source } => {
                assert_eq!(file_name, "report.pdf");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_write_returns_destination() {
        let dir = tempfile::tempdir().unwrap();
        let handler = UploadHandler::new(dir.path());

        let path = handler.write("data.bin", b"123").await.unwrap();

        assert_eq!(path, dir.path().join("data.bin"));
        assert_eq!(std::fs::read(path).unwrap(), b"123");
    }
}
