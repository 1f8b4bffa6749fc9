//! Attachment collection.

use crate::collaborators::FileStorage;
use crate::error::ZendeskError;
use crate::models::AttachmentSource;
use crate::webform::{AttachmentPolicy, SubmissionRecord};

/// Loads the stored files referenced by the submission's file elements.
///
/// `field_names` restricts which file elements are used; empty means all
/// of them. Elements without files are skipped. A file that cannot be loaded
/// is logged and skipped under [`AttachmentPolicy::BestEffort`].
///
/// # Errors
///
/// Under [`AttachmentPolicy::Abort`], returns the first load failure.
pub async fn collect_attachments(
    submission: &SubmissionRecord,
    field_names: &[String],
    storage: &dyn FileStorage,
    policy: AttachmentPolicy,
) -> Result<Vec<AttachmentSource>, ZendeskError> {
    let fields: Vec<&str> = if field_names.is_empty() {
        submission.file_fields().collect()
    } else {
        field_names.iter().map(String::as_str).collect()
    };

    let mut sources = Vec::new();
    for field in fields {
        let Some(file_ids) = submission.files.get(field) else {
            continue;
        };
        for file_id in file_ids {
            match storage.load_file(file_id).await {
                Ok(source) => sources.push(source),
                Err(e) if policy == AttachmentPolicy::BestEffort => {
                    tracing::warn!(
                        submission_id = %submission.id,
                        field = %field,
                        file_id = %file_id,
                        error = %e,
                        "Skipping attachment that could not be loaded"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(sources)
}
