//! End-to-end tests for `ZendeskHandler` with in-memory collaborators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zendesk_webform::collaborators::{
    DirectoryFileStorage, FailureLogger, FileStorage, TicketFailure, TicketingClient,
};
use zendesk_webform::config::ZendeskConfig;
use zendesk_webform::error::ZendeskError;
use zendesk_webform::handler::{SubmissionOutcome, ZendeskHandler};
use zendesk_webform::models::{
    AttachmentSource, CustomField, Priority, TicketId, TicketRequest, UploadToken, User,
    UserFilter,
};
use zendesk_webform::webform::{
    AttachmentPolicy, ConfigurationTemplate, FileId, OriginMarker, SubmissionRecord,
};
use zendesk_webform::zendesk_client::ZendeskClient;

/// Ticketing client recording every call.
#[derive(Default)]
struct FakeZendesk {
    created: Mutex<Vec<TicketRequest>>,
    uploaded: Mutex<Vec<String>>,
    searches: Mutex<Vec<UserFilter>>,
    agents: Vec<User>,
    fail_create: Option<fn() -> ZendeskError>,
    fail_upload_of: Option<String>,
}

impl FakeZendesk {
    fn created(&self) -> Vec<TicketRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketingClient for FakeZendesk {
    async fn create_ticket(&self, ticket: &TicketRequest) -> Result<TicketId, ZendeskError> {
        self.created.lock().unwrap().push(ticket.clone());
        match self.fail_create {
            Some(make_error) => Err(make_error()),
            None => Ok(TicketId(9001)),
        }
    }

    async fn upload_attachment(
        &self,
        source: &AttachmentSource,
    ) -> Result<UploadToken, ZendeskError> {
        if self.fail_upload_of.as_deref() == Some(source.file_name.as_str()) {
            return Err(ZendeskError::attachment(&source.file_name, "upload rejected"));
        }
        self.uploaded.lock().unwrap().push(source.file_name.clone());
        Ok(UploadToken(format!("token-{}", source.file_name)))
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, ZendeskError> {
        self.searches.lock().unwrap().push(filter.clone());
        Ok(self.agents.clone())
    }

    fn sanitize(&self, message: &str) -> String {
        ZendeskError::sanitize_message(message, "hunter2")
    }
}

/// File storage backed by a map of file id to file name.
struct MemoryFiles(HashMap<String, String>);

#[async_trait]
impl FileStorage for MemoryFiles {
    async fn load_file(&self, file_id: &FileId) -> Result<AttachmentSource, ZendeskError> {
        let file_name = self
            .0
            .get(&file_id.0)
            .ok_or_else(|| ZendeskError::attachment(file_id.to_string(), "no such file"))?;
        Ok(AttachmentSource {
            uri: format!("/files/{}", file_name),
            mime_type: "application/octet-stream".to_string(),
            file_name: file_name.clone(),
        })
    }
}

#[derive(Default)]
struct RecordingLogger(Mutex<Vec<TicketFailure>>);

impl FailureLogger for RecordingLogger {
    fn log_failure(&self, failure: &TicketFailure) {
        self.0.lock().unwrap().push(failure.clone());
    }
}

fn files() -> Arc<MemoryFiles> {
    Arc::new(MemoryFiles(HashMap::from([
        ("10".to_string(), "screenshot.png".to_string()),
        ("11".to_string(), "log.txt".to_string()),
    ])))
}

fn contact_template() -> ConfigurationTemplate {
    ConfigurationTemplate {
        requester: "email".to_string(),
        requester_name: "name".to_string(),
        subject: "subject".to_string(),
        comment: "message".to_string(),
        tags: "Test, tag".to_string(),
        priority: "high".to_string(),
        assignee_id: "agent@acme.com".to_string(),
        collaborators: "manager@acme.com,, support@acme.com".to_string(),
        custom_fields: "\"1500\": department\n\"1501\": 42\n".to_string(),
        ..ConfigurationTemplate::default()
    }
}

fn contact_submission() -> SubmissionRecord {
    SubmissionRecord::new("314")
        .with_value("email", "jane@example.com")
        .with_value("name", json!({"title": "Dr", "first": "Jane", "last": "Doe"}))
        .with_value("subject", "Printer on fire")
        .with_value("message", "Third floor, near the kitchen.")
        .with_value("department", "Facilities")
        .with_files("attachments", ["10", "11"])
}

fn agent() -> User {
    serde_json::from_value(json!({
        "id": 77,
        "name": "Agent",
        "email": "Agent@Acme.com",
        "role": "agent",
        "active": true
    }))
    .unwrap()
}

#[tokio::test]
async fn test_submission_becomes_ticket() {
    let client = Arc::new(FakeZendesk {
        agents: vec![agent()],
        ..FakeZendesk::default()
    });
    let logger = Arc::new(RecordingLogger::default());
    let handler = ZendeskHandler::new("Contact", contact_template(), client.clone(), files())
        .with_failure_logger(logger.clone());

    let mut submission = contact_submission();
    let outcome = handler.post_save(&mut submission, false).await;
    assert_eq!(outcome, SubmissionOutcome::TicketCreated(TicketId(9001)));

    let created = client.created();
    assert_eq!(created.len(), 1);
    let ticket = &created[0];
    assert_eq!(ticket.subject, "Printer on fire");
    assert_eq!(ticket.requester.email, "jane@example.com");
    assert_eq!(ticket.requester.name.as_deref(), Some("Dr Jane Doe"));
    assert_eq!(ticket.comment.body, "Third floor, near the kitchen.");
    assert_eq!(
        ticket.comment.uploads,
        vec!["token-screenshot.png".to_string(), "token-log.txt".to_string()]
    );
    assert_eq!(ticket.tags, vec!["test".to_string(), "tag".to_string()]);
    assert_eq!(ticket.priority, Some(Priority::High));
    assert_eq!(ticket.assignee_id, Some(77));
    assert_eq!(
        ticket.collaborators,
        vec!["manager@acme.com".to_string(), "support@acme.com".to_string()]
    );
    assert_eq!(
        ticket.custom_fields,
        vec![
            CustomField::new("1500", "Facilities"),
            CustomField::new("1501", 42),
            CustomField::new("360017939614", "Webform"),
        ]
    );
    assert_eq!(ticket.external_id, "314");

    assert_eq!(submission.value("notes"), Some(&json!("Ticket: 9001\n")));
    assert!(logger.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_update_is_skipped() {
    let client = Arc::new(FakeZendesk::default());
    let handler = ZendeskHandler::new("Contact", contact_template(), client.clone(), files());

    let mut submission = contact_submission();
    let outcome = handler.post_save(&mut submission, true).await;

    assert_eq!(outcome, SubmissionOutcome::Skipped);
    assert!(client.created().is_empty());
    assert!(client.searches.lock().unwrap().is_empty());
    assert_eq!(submission, contact_submission());
}

#[tokio::test]
async fn test_client_failure_is_logged_once() {
    let client = Arc::new(FakeZendesk {
        fail_create: Some(|| ZendeskError::ZendeskApi {
            error: "RecordInvalid".to_string(),
            description: "Requester is invalid\n  (token hunter2)".to_string(),
        }),
        ..FakeZendesk::default()
    });
    let logger = Arc::new(RecordingLogger::default());
    let handler = ZendeskHandler::new("Contact", contact_template(), client.clone(), files())
        .with_failure_logger(logger.clone());

    let mut submission = contact_submission();
    let outcome = handler.post_save(&mut submission, false).await;

    let failures = logger.0.lock().unwrap().clone();
    assert_eq!(failures.len(), 1);
    let failure = &failures[0];
    assert_eq!(failure.form_label, "Contact");
    assert_eq!(failure.submission_id, "314");
    assert_eq!(failure.error_kind, "ZendeskApi");
    assert_eq!(
        failure.message,
        "Zendesk API error RecordInvalid: Requester is invalid (token [REDACTED])"
    );
    assert_eq!(outcome, SubmissionOutcome::Failed(failure.clone()));
    assert_eq!(client.created().len(), 1);
    assert_eq!(submission.value("notes"), None);
}

#[tokio::test]
async fn test_mapping_failure_makes_no_ticket_call() {
    let template = ConfigurationTemplate {
        priority: "whenever".to_string(),
        ..contact_template()
    };
    let client = Arc::new(FakeZendesk::default());
    let logger = Arc::new(RecordingLogger::default());
    let handler = ZendeskHandler::new("Contact", template, client.clone(), files())
        .with_failure_logger(logger.clone());

    let outcome = handler.post_save(&mut contact_submission(), false).await;

    assert!(matches!(outcome, SubmissionOutcome::Failed(_)));
    assert!(client.created().is_empty());
    assert!(client.uploaded.lock().unwrap().is_empty());
    assert_eq!(logger.0.lock().unwrap()[0].error_kind, "Mapping");
}

#[tokio::test]
async fn test_best_effort_skips_failed_upload() {
    let client = Arc::new(FakeZendesk {
        fail_upload_of: Some("log.txt".to_string()),
        ..FakeZendesk::default()
    });
    let handler = ZendeskHandler::new("Contact", contact_template(), client.clone(), files());

    let outcome = handler.post_save(&mut contact_submission(), false).await;

    assert_eq!(outcome, SubmissionOutcome::TicketCreated(TicketId(9001)));
    assert_eq!(
        client.created()[0].comment.uploads,
        vec!["token-screenshot.png".to_string()]
    );
}

#[tokio::test]
async fn test_abort_policy_fails_before_create() {
    let template = ConfigurationTemplate {
        attachment_policy: AttachmentPolicy::Abort,
        ..contact_template()
    };
    let client = Arc::new(FakeZendesk {
        fail_upload_of: Some("log.txt".to_string()),
        ..FakeZendesk::default()
    });
    let logger = Arc::new(RecordingLogger::default());
    let handler = ZendeskHandler::new("Contact", template, client.clone(), files())
        .with_failure_logger(logger.clone());

    let outcome = handler.post_save(&mut contact_submission(), false).await;

    assert!(matches!(outcome, SubmissionOutcome::Failed(_)));
    assert!(client.created().is_empty());
    assert_eq!(logger.0.lock().unwrap()[0].error_kind, "Attachment");
}

#[tokio::test]
async fn test_attachment_fields_restrict_uploads() {
    let template = ConfigurationTemplate {
        attachment_fields: vec!["resume".to_string()],
        ..contact_template()
    };
    let client = Arc::new(FakeZendesk::default());
    let handler = ZendeskHandler::new("Contact", template, client.clone(), files());

    handler.post_save(&mut contact_submission(), false).await;

    assert!(client.uploaded.lock().unwrap().is_empty());
    assert!(client.created()[0].comment.uploads.is_empty());
}

#[tokio::test]
async fn test_literal_text_and_tokens() {
    let template = ConfigurationTemplate {
        requester: "email".to_string(),
        subject: "Web request #[webform_submission:sid] from [webform_submission:values:department]"
            .to_string(),
        comment: "[webform_submission:values]".to_string(),
        origin_marker: None,
        ..ConfigurationTemplate::default()
    };
    let client = Arc::new(FakeZendesk::default());
    let handler = ZendeskHandler::new("Contact", template, client.clone(), files());

    let submission = SubmissionRecord::new("5")
        .with_value("email", "jane@example.com")
        .with_value("department", "Facilities");
    let ticket = handler.build_ticket(&submission).await.unwrap();

    assert_eq!(ticket.subject, "Web request #5 from Facilities");
    assert_eq!(
        ticket.comment.body,
        "department: Facilities\nemail: jane@example.com"
    );
    assert_eq!(ticket.tags, vec!["drupal".to_string(), "webform".to_string()]);
    assert!(ticket.custom_fields.is_empty());
    assert_eq!(ticket.assignee_id, None);
}

#[tokio::test]
async fn test_custom_origin_marker() {
    let template = ConfigurationTemplate {
        origin_marker: Some(OriginMarker {
            field_id: "1500".to_string(),
            value: "Portal".to_string(),
        }),
        ..contact_template()
    };
    let client = Arc::new(FakeZendesk::default());
    let handler = ZendeskHandler::new("Contact", template, client.clone(), files());

    let ticket = handler.build_ticket(&contact_submission()).await.unwrap();
    assert_eq!(
        ticket.custom_fields,
        vec![
            CustomField::new("1500", "Portal"),
            CustomField::new("1501", 42)
        ]
    );
}

#[tokio::test]
async fn test_indented_custom_fields_yaml() {
    let template = ConfigurationTemplate {
        custom_fields: "  \"1500\": department\n  \"1501\": name\n".to_string(),
        origin_marker: None,
        ..contact_template()
    };
    assert!(template.clone().sanitize().validate(&["email", "department"]).is_ok());

    let client = Arc::new(FakeZendesk::default());
    let handler = ZendeskHandler::new("Contact", template, client.clone(), files());

    let ticket = handler.build_ticket(&contact_submission()).await.unwrap();
    assert_eq!(
        ticket.custom_fields,
        vec![
            CustomField::new("1500", "Facilities"),
            CustomField::new("1501", "Dr Jane Doe")
        ]
    );
}

#[tokio::test]
async fn test_against_mock_zendesk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/users/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/uploads.json"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"upload": {"token": "up-1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v2/tickets.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ticket": {"id": 123}})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("report.pdf"), b"%PDF-1.4").unwrap();

    let config = ZendeskConfig::new("acme", "agent@acme.com", "real-looking-token")
        .unwrap()
        .with_base_url(server.uri())
        .unwrap();
    let client = Arc::new(ZendeskClient::new(&config).unwrap());
    let handler = ZendeskHandler::new(
        "Contact",
        contact_template(),
        client,
        Arc::new(DirectoryFileStorage::new(dir.path())),
    );

    let mut submission = contact_submission().with_files("attachments", ["report.pdf"]);
    let outcome = handler.post_save(&mut submission, false).await;

    assert_eq!(outcome, SubmissionOutcome::TicketCreated(TicketId(123)));
    assert_eq!(submission.value("notes"), Some(&json!("Ticket: 123\n")));

    let requests = server.received_requests().await.unwrap();
    let ticket_call = requests
        .iter()
        .find(|r| r.url.path() == "/api/v2/tickets.json")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&ticket_call.body).unwrap();
    assert_eq!(body["ticket"]["comment"]["uploads"], json!(["up-1"]));
    assert_eq!(body["ticket"]["tags"], json!(["test", "tag"]));
    assert!(body["ticket"].get("assignee_id").is_none());
}
