//! Collaborators the handler depends on.
//!
//! The handler never reaches for global services. Everything it needs
//! (the ticketing API, token replacement, stored files, failure logging)
//! is passed in as one of the traits below.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::ZendeskError;
use crate::models::{AttachmentSource, TicketId, TicketRequest, UploadToken, User, UserFilter};
use crate::webform::{ConfigurationTemplate, FileId, SubmissionRecord};

/// Ticketing system the handler creates tickets in.
#[async_trait]
pub trait TicketingClient: Send + Sync {
    /// Creates a ticket and returns its id.
    async fn create_ticket(&self, ticket: &TicketRequest) -> Result<TicketId, ZendeskError>;

    /// Uploads one file and returns the token to reference it from a comment.
    async fn upload_attachment(
        &self,
        source: &AttachmentSource,
    ) -> Result<UploadToken, ZendeskError>;

    /// Lists users matching the filter.
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, ZendeskError>;

    /// Removes secrets known to the client from a message.
    fn sanitize(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Expands placeholder tokens in a template against a submission.
pub trait TokenReplacer: Send + Sync {
    /// Returns a copy of the template with tokens replaced.
    fn replace(
        &self,
        template: &ConfigurationTemplate,
        submission: &SubmissionRecord,
    ) -> ConfigurationTemplate;
}

/// Storage holding the files uploaded through file elements.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Describes a stored file.
    async fn load_file(&self, file_id: &FileId) -> Result<AttachmentSource, ZendeskError>;
}

/// A ticket that could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketFailure {
    /// Label of the form the submission belongs to.
    pub form_label: String,
    /// Submission that failed.
    pub submission_id: String,
    /// Error class, see [`ZendeskError::kind`].
    pub error_kind: String,
    /// Sanitized error message.
    pub message: String,
}

/// Records tickets that could not be created.
pub trait FailureLogger: Send + Sync {
    /// Logs one failure.
    fn log_failure(&self, failure: &TicketFailure);
}

/// Logs failures through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingFailureLogger;

impl FailureLogger for TracingFailureLogger {
    fn log_failure(&self, failure: &TicketFailure) {
        tracing::error!(
            form = %failure.form_label,
            submission_id = %failure.submission_id,
            exception = %failure.error_kind,
            "{} webform submission to zendesk failed. {}: {}.",
            failure.form_label,
            failure.error_kind,
            failure.message
        );
    }
}

/// Serves stored files from a directory; file ids are paths relative to it.
#[derive(Debug, Clone)]
pub struct DirectoryFileStorage {
    root: PathBuf,
}

impl DirectoryFileStorage {
    /// Creates a storage rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a file id below the root, refusing ids that escape it.
    fn resolve(&self, file_id: &FileId) -> Result<PathBuf, ZendeskError> {
        let relative = Path::new(&file_id.0);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file_id.0.trim().is_empty() || escapes {
            return Err(ZendeskError::attachment(
                file_id.to_string(),
                "file id must be a relative path inside the storage root",
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FileStorage for DirectoryFileStorage {
    async fn load_file(&self, file_id: &FileId) -> Result<AttachmentSource, ZendeskError> {
        let path = self.resolve(file_id)?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ZendeskError::attachment(file_id.to_string(), e.to_string()))?;
        if !metadata.is_file() {
            return Err(ZendeskError::attachment(file_id.to_string(), "not a file"));
        }

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_id.to_string());
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(AttachmentSource {
            uri: path.to_string_lossy().into_owned(),
            mime_type,
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_storage_describes_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"%PDF-1.4").unwrap();
        let storage = DirectoryFileStorage::new(dir.path());

        let source =
            tokio_test::block_on(storage.load_file(&FileId("report.pdf".to_string()))).unwrap();
        assert_eq!(source.file_name, "report.pdf");
        assert_eq!(source.mime_type, "application/pdf");
        assert!(source.uri.ends_with("report.pdf"));
    }

    #[test]
    fn test_directory_storage_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blob.zzzz"), b"data").unwrap();
        let storage = DirectoryFileStorage::new(dir.path());

        let source =
            tokio_test::block_on(storage.load_file(&FileId("blob.zzzz".to_string()))).unwrap();
        assert_eq!(source.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_directory_storage_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirectoryFileStorage::new(dir.path());

        let err = tokio_test::block_on(storage.load_file(&FileId("nope.txt".to_string())))
            .unwrap_err();
        assert_eq!(err.kind(), "Attachment");
    }

    #[test]
    fn test_directory_storage_rejects_escaping_ids() {
        let storage = DirectoryFileStorage::new("/srv/files");
        assert!(storage.resolve(&FileId("../etc/passwd".to_string())).is_err());
        assert!(storage.resolve(&FileId("/etc/passwd".to_string())).is_err());
        assert!(storage.resolve(&FileId("".to_string())).is_err());
        assert!(storage.resolve(&FileId("uploads/a.txt".to_string())).is_ok());
    }
}
