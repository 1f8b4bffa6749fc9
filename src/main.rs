//! zendesk-webform - create a Zendesk ticket from a saved form submission
//!
//! Reads a handler configuration template (YAML) and a submission (JSON),
//! creates the ticket and prints the annotated submission to stdout.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `ZENDESK_SUBDOMAIN`: Zendesk account subdomain
//! - `ZENDESK_USER_EMAIL`: Agent email the API token belongs to
//! - `ZENDESK_API_TOKEN`: API token for authentication
//!
//! # Usage
//!
//! ```bash
//! zendesk-webform contact.yaml submission.json --files-root /srv/webform/files
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use zendesk_webform::collaborators::DirectoryFileStorage;
use zendesk_webform::config::ZendeskConfig;
use zendesk_webform::handler::{SubmissionOutcome, ZendeskHandler};
use zendesk_webform::webform::{ConfigurationTemplate, SubmissionRecord};
use zendesk_webform::zendesk_client::ZendeskClient;

const USAGE: &str = "usage: zendesk-webform <template.yaml> <submission.json> [--files-root DIR]";

/// Parsed command line.
struct Args {
    template: PathBuf,
    submission: PathBuf,
    files_root: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut positional = Vec::new();
    let mut files_root = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--files-root" => {
                let dir = args.next().context("--files-root needs a directory")?;
                files_root = Some(PathBuf::from(dir));
            }
            "-h" | "--help" => bail!(USAGE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let [template, submission]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!(USAGE))?;

    Ok(Args {
        template,
        submission,
        files_root,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries the annotated submission, logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zendesk_webform=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = parse_args(std::env::args().skip(1))?;

    let template_text = tokio::fs::read_to_string(&args.template)
        .await
        .with_context(|| format!("Failed to read template {}", args.template.display()))?;
    let template = ConfigurationTemplate::from_yaml(&template_text)
        .context("Failed to parse template")?
        .sanitize();

    let submission_text = tokio::fs::read_to_string(&args.submission)
        .await
        .with_context(|| format!("Failed to read submission {}", args.submission.display()))?;
    let mut submission =
        SubmissionRecord::from_json(&submission_text).context("Failed to parse submission")?;

    let keys: Vec<&str> = submission.data.keys().map(String::as_str).collect();
    template
        .validate(&keys)
        .context("Template is not valid for this submission")?;

    let config = ZendeskConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(base_url = %config.api_base_url(), "Configuration loaded");

    let client = ZendeskClient::new(&config).context("Failed to create Zendesk client")?;

    if let Err(e) = client.test_connection().await {
        tracing::error!(error = %e, "Connection test failed");
        tracing::warn!("Continuing anyway; ticket creation will likely fail");
    }

    let files_root = args.files_root.unwrap_or_else(|| {
        args.submission
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let form_label = args
        .template
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "webform".to_string());

    tracing::info!(form = %form_label, submission_id = %submission.id, "Processing submission");

    let handler = ZendeskHandler::new(
        form_label,
        template,
        Arc::new(client.clone()),
        Arc::new(DirectoryFileStorage::new(files_root)),
    );

    match handler.post_save(&mut submission, false).await {
        SubmissionOutcome::TicketCreated(ticket_id) => {
            tracing::info!(url = %client.ticket_web_url(ticket_id), "Ticket created");
            let annotated = serde_json::to_string_pretty(&submission)
                .context("Failed to serialize submission")?;
            println!("{}", annotated);
            Ok(())
        }
        SubmissionOutcome::Failed(failure) => {
            bail!("{}: {}", failure.error_kind, failure.message)
        }
        SubmissionOutcome::Skipped => Ok(()),
    }
}
