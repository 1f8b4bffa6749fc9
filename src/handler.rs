//! The Zendesk form handler.
//!
//! `ZendeskHandler` turns a saved submission into a ticket. It owns the
//! configuration template and the collaborators; each submission runs the
//! mapping pipeline once and calls the ticketing client's `create_ticket`
//! exactly once.

use std::sync::Arc;

use crate::collaborators::{
    FailureLogger, FileStorage, TicketFailure, TicketingClient, TokenReplacer,
    TracingFailureLogger,
};
use crate::error::ZendeskError;
use crate::mapping::{
    add_uploads, build_ticket_request, collect_attachments, resolve, resolve_assignee,
};
use crate::models::{TicketId, TicketRequest, UploadToken};
use crate::tokens::WebformTokens;
use crate::webform::{AttachmentPolicy, ConfigurationTemplate, SubmissionRecord};

/// Maximum length of a failure message handed to the failure logger.
const MAX_FAILURE_MESSAGE_LEN: usize = 1000;

/// What `post_save` did with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The submission was an update; no ticket was created.
    Skipped,
    /// A ticket was created and recorded on the submission.
    TicketCreated(TicketId),
    /// Ticket creation failed; the failure has been logged.
    Failed(TicketFailure),
}

/// Creates Zendesk tickets for form submissions.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(ZendeskClient::new(&config)?);
/// let files = Arc::new(DirectoryFileStorage::new("/srv/webform"));
/// let handler = ZendeskHandler::new("Contact", template, client, files);
///
/// match handler.post_save(&mut submission, false).await {
///     SubmissionOutcome::TicketCreated(id) => println!("ticket {}", id),
///     other => println!("{:?}", other),
/// }
/// ```
#[derive(Clone)]
pub struct ZendeskHandler {
    form_label: String,
    template: ConfigurationTemplate,
    client: Arc<dyn TicketingClient>,
    tokens: Arc<dyn TokenReplacer>,
    files: Arc<dyn FileStorage>,
    failures: Arc<dyn FailureLogger>,
}

impl ZendeskHandler {
    /// Creates a handler using [`WebformTokens`] and [`TracingFailureLogger`].
    pub fn new(
        form_label: impl Into<String>,
        template: ConfigurationTemplate,
        client: Arc<dyn TicketingClient>,
        files: Arc<dyn FileStorage>,
    ) -> Self {
        Self {
            form_label: form_label.into(),
            template: template.sanitize(),
            client,
            tokens: Arc::new(WebformTokens),
            files,
            failures: Arc::new(TracingFailureLogger),
        }
    }

    /// Replaces the token replacer.
    pub fn with_token_replacer(mut self, tokens: Arc<dyn TokenReplacer>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Replaces the failure logger.
    pub fn with_failure_logger(mut self, failures: Arc<dyn FailureLogger>) -> Self {
        self.failures = failures;
        self
    }

    /// Label of the form this handler is attached to.
    pub fn form_label(&self) -> &str {
        &self.form_label
    }

    /// The configuration template.
    pub fn template(&self) -> &ConfigurationTemplate {
        &self.template
    }

    /// One `name: value` line per configured attribute.
    pub fn summary(&self) -> String {
        self.template.summary()
    }

    /// Builds the ticket payload for a submission, uploading its attachments.
    ///
    /// # Errors
    ///
    /// Returns mapping errors before any network call. Upload errors are
    /// returned only under [`AttachmentPolicy::Abort`].
    pub async fn build_ticket(
        &self,
        submission: &SubmissionRecord,
    ) -> Result<TicketRequest, ZendeskError> {
        let template = self.tokens.replace(&self.template, submission);
        let resolved = resolve(&template, submission);

        let mut request =
            build_ticket_request(&resolved, submission, template.origin_marker.as_ref())?;
        request.assignee_id = resolve_assignee(&resolved.assignee_id, self.client.as_ref()).await?;

        let sources = collect_attachments(
            submission,
            &template.attachment_fields,
            self.files.as_ref(),
            template.attachment_policy,
        )
        .await?;

        let mut uploads: Vec<UploadToken> = Vec::with_capacity(sources.len());
        for source in &sources {
            match self.client.upload_attachment(source).await {
                Ok(token) => uploads.push(token),
                Err(e) if template.attachment_policy == AttachmentPolicy::BestEffort => {
                    tracing::warn!(
                        submission_id = %submission.id,
                        file_name = %source.file_name,
                        error = %self.client.sanitize(&e.to_string()),
                        "Skipping attachment that could not be uploaded"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        add_uploads(&mut request.comment, &uploads);

        Ok(request)
    }

    /// Creates the ticket for a submission.
    ///
    /// # Errors
    ///
    /// Returns any mapping, attachment or API error.
    pub async fn submit_ticket(
        &self,
        submission: &SubmissionRecord,
    ) -> Result<TicketId, ZendeskError> {
        let request = self.build_ticket(submission).await?;

        tracing::debug!(
            form = %self.form_label,
            submission_id = %submission.id,
            uploads = request.comment.uploads.len(),
            "Submitting ticket"
        );

        self.client.create_ticket(&request).await
    }

    /// Hook run after a submission is saved.
    ///
    /// New submissions get a ticket, recorded on the submission's notes.
    /// Updates are skipped. Failures are logged once through the failure
    /// logger and never returned as errors.
    pub async fn post_save(
        &self,
        submission: &mut SubmissionRecord,
        update: bool,
    ) -> SubmissionOutcome {
        if update {
            tracing::debug!(submission_id = %submission.id, "Skipping updated submission");
            return SubmissionOutcome::Skipped;
        }

        match self.submit_ticket(submission).await {
            Ok(ticket_id) => {
                submission.annotate_ticket(ticket_id);
                tracing::info!(
                    form = %self.form_label,
                    submission_id = %submission.id,
                    ticket_id = %ticket_id,
                    "Created ticket for submission"
                );
                SubmissionOutcome::TicketCreated(ticket_id)
            }
            Err(e) => {
                let failure = TicketFailure {
                    form_label: self.form_label.clone(),
                    submission_id: submission.id.clone(),
                    error_kind: e.kind().to_string(),
                    message: failure_message(&self.client.sanitize(&e.to_string())),
                };
                self.failures.log_failure(&failure);
                SubmissionOutcome::Failed(failure)
            }
        }
    }
}

/// Flattens a message onto one line and bounds its length.
fn failure_message(message: &str) -> String {
    let flat = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > MAX_FAILURE_MESSAGE_LEN {
        let kept: String = flat.chars().take(MAX_FAILURE_MESSAGE_LEN).collect();
        format!("{}...", kept)
    } else {
        flat
    }
}
