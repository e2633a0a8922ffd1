//! `coscribe enhance` — One-shot prompt enhancement via the workflow webhook.

use std::path::PathBuf;

use coscribe_config::AppConfig;
use coscribe_core::webhook::WorkflowWebhook;
use coscribe_document::import;
use coscribe_webhook::WorkflowClient;

pub async fn run(
    prompt: &str,
    with_document: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let client = WorkflowClient::from_config(&config.webhook).map_err(|e| {
        format!("Workflow webhook not usable: {e}. Set COSCRIBE_WEBHOOK_URL or webhook.url.")
    })?;

    let document = match &with_document {
        Some(path) => Some(import::import_file(path)?),
        None => None,
    };

    eprint!("  Enhancing...");
    let enhanced = client.enhance_prompt(prompt, document.as_deref()).await?;
    eprint!("\r             \r");
    println!("{enhanced}");

    Ok(())
}
