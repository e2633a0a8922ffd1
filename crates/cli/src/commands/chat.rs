//! `coscribe chat` — Interactive co-writing session or single-message mode.
//!
//! Interactive mode is both conversation and editor. Plain lines go to the
//! session (so `/research …` routes to the workflow webhook), `:`-prefixed
//! lines operate on the document store, and an assistant reply carrying an
//! edit suggestion is committed as a new document version automatically.

use std::path::PathBuf;
use std::sync::Arc;

use coscribe_config::AppConfig;
use coscribe_core::event::{DomainEvent, EventBus};
use coscribe_core::webhook::WorkflowWebhook;
use coscribe_document::{DocumentHandle, UndoStatus, import, markdown};
use coscribe_session::{CommandRouter, ContextAssembler, DispatchLoop, Session};
use coscribe_webhook::WorkflowClient;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    document_path: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENROUTER_API_KEY='sk-or-v1-...'   (recommended)");
        eprintln!("    export OPENAI_API_KEY='sk-...'             (for OpenAI direct)");
        eprintln!("    export COSCRIBE_API_KEY='sk-...'           (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get an OpenRouter key at: https://openrouter.ai/keys");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let event_bus = Arc::new(EventBus::default());
    let document = DocumentHandle::new();

    if let Some(path) = &document_path {
        let content = import::import_file(path)?;
        let sequence = document.commit(content).await;
        println!("  Loaded {} as document version {sequence}", path.display());
    }

    let provider = coscribe_providers::build_from_config(&config);
    let tools = Arc::new(coscribe_tools::default_registry(&config, document.clone()));
    let research_active = !tools.is_empty();

    let webhook: Option<Arc<dyn WorkflowWebhook>> = if config.webhook.enabled {
        match WorkflowClient::from_config(&config.webhook) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                tracing::warn!(error = %e, "Workflow webhook disabled");
                None
            }
        }
    } else {
        None
    };
    let webhook_active = webhook.is_some();

    let router = CommandRouter::new(webhook, &config.command, event_bus.clone());
    let dispatch = DispatchLoop::new(
        provider,
        tools,
        ContextAssembler::new(&config.context),
        event_bus.clone(),
        &config,
    );
    let session = Session::new(router, dispatch, document.clone(), event_bus.clone());

    if verbose {
        spawn_activity_tap(&event_bus);
    }

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = session.submit(&msg).await;
        eprint!("\r              \r");
        println!("{reply}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Coscribe — Co-writing Session         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.provider.model);
    println!(
        "  Research:  {}",
        if research_active {
            "enabled (model can call it)"
        } else {
            "not configured"
        }
    );
    println!(
        "  Webhook:   {}",
        if webhook_active {
            "configured (/research routes to it)"
        } else {
            "not configured (/research goes to the model)"
        }
    );
    println!();
    println!("  Type a message and press Enter to chat.");
    println!("  {} <query> sends the query to the workflow.", config.command.prefix);
    println!("  :help lists the editor commands. Type 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            prompt()?;
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        if let Some(command) = input.strip_prefix(':') {
            editor_command(command, &document, &session).await?;
        } else {
            eprint!("  ...");
            let reply = session.submit(input).await;
            eprint!("\r     \r");
            println!();
            for line in reply.lines() {
                println!("  Assistant > {line}");
            }

            // Model-suggested document update: commit it and say so.
            if let Some(update) = markdown::extract_document_update(&reply) {
                let sequence = document.commit(update).await;
                println!();
                println!("  [document updated to version {sequence} — :show to view, :undo to revert]");
            }
            println!();
        }

        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}

/// Handle one `:`-prefixed editor command.
async fn editor_command(
    command: &str,
    document: &DocumentHandle,
    session: &Session,
) -> Result<(), Box<dyn std::error::Error>> {
    let (verb, rest) = match command.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (command, ""),
    };

    match verb {
        "show" => {
            let current = document.current().await;
            if current.content.is_empty() {
                println!("  (the document is empty)");
            } else {
                println!();
                println!("  ── document (version {}) ──", current.sequence);
                for line in current.content.lines() {
                    println!("  {line}");
                }
                println!("  ──");
            }
        }
        "edit" => {
            if rest.is_empty() {
                println!("  Usage: :edit <new document text>");
            } else {
                let sequence = document.commit(rest).await;
                println!("  Committed version {sequence}");
            }
        }
        "load" => {
            if rest.is_empty() {
                println!("  Usage: :load <path>");
            } else {
                match import::import_file(std::path::Path::new(rest)) {
                    Ok(content) => {
                        let sequence = document.commit(content).await;
                        println!("  Loaded {rest} as version {sequence}");
                    }
                    Err(e) => println!("  Import failed: {e}"),
                }
            }
        }
        "undo" => {
            let (version, status) = document.undo().await;
            match status {
                UndoStatus::Rewound => {
                    println!("  Reverted to version {}", version.sequence)
                }
                UndoStatus::NothingToUndo => println!("  Nothing to undo"),
            }
        }
        "toc" => {
            let current = document.current().await;
            let toc = markdown::table_of_contents(&current.content);
            if toc.is_empty() {
                println!("  (no headers found)");
            } else {
                for line in toc.lines() {
                    println!("  {line}");
                }
            }
        }
        "format" => {
            let current = document.current().await;
            let formatted = markdown::format_markdown(&current.content);
            if formatted == current.content {
                println!("  Document is already well-formatted");
            } else {
                let sequence = document.commit(formatted).await;
                println!("  Formatted — committed version {sequence}");
            }
        }
        "history" => {
            let history = document.history().await;
            let current = document.current().await;
            println!("  {} committed version(s)", document.version_count().await);
            for version in &history {
                let marker = if version.sequence == current.sequence {
                    "*"
                } else {
                    " "
                };
                let summary = version
                    .content
                    .lines()
                    .next()
                    .unwrap_or("")
                    .chars()
                    .take(48)
                    .collect::<String>();
                println!(
                    "  {marker} v{} {} {} ({} chars)",
                    version.sequence,
                    version.created_at.format("%H:%M:%S"),
                    summary,
                    version.content.len()
                );
            }
        }
        "clear" => {
            session.clear().await;
            println!("  Conversation cleared (document untouched)");
        }
        "help" => {
            println!("  :show          print the current document");
            println!("  :edit <text>   commit <text> as a new version");
            println!("  :load <path>   import a .md/.txt file as a new version");
            println!("  :undo          rewind to the previous version");
            println!("  :toc           table of contents for the current version");
            println!("  :format        normalize markdown and commit");
            println!("  :history       list all versions");
            println!("  :clear         reset the conversation (keeps the document)");
            println!("  :help          this list");
        }
        other => {
            println!("  Unknown command ':{other}' — try :help");
        }
    }

    Ok(())
}

/// Print tool and webhook activity as it happens (verbose mode).
fn spawn_activity_tap(event_bus: &EventBus) {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event.as_ref() {
                DomainEvent::ToolExecuted {
                    tool_name,
                    success,
                    duration_ms,
                    ..
                } => {
                    let status = if *success { "ok" } else { "failed" };
                    eprintln!("  [tool] {tool_name}: {status} in {duration_ms}ms");
                }
                DomainEvent::WebhookCalled {
                    kind,
                    success,
                    duration_ms,
                    ..
                } => {
                    let status = if *success { "ok" } else { "failed" };
                    eprintln!("  [webhook] {kind}: {status} in {duration_ms}ms");
                }
                DomainEvent::ErrorOccurred {
                    context,
                    error_message,
                    ..
                } => {
                    eprintln!("  [error] {context}: {error_message}");
                }
                _ => {}
            }
        }
    });
}
