use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use lantern_application::{ChatService, ExportService, SendOutcome, TrainingService};
use lantern_core::clipboard::ClipboardAggregator;
use lantern_core::session::MessageRole;
use lantern_core::state::StateRepository;
use lantern_infrastructure::{ConfigService, TomlStateRepository};
use lantern_interaction::{AssistantBackend, BackendClient, ChatOptions, UploadFile};

mod command;

use command::{COMMANDS, Command};

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        let commands = COMMANDS
            .iter()
            .filter_map(|(usage, _)| usage.split_whitespace().next())
            .filter(|name| name.starts_with('/'))
            .map(str::to_string)
            .collect();
        Self { commands }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// The main entry point for the Lantern readline REPL application.
///
/// Sets up a rustyline-based REPL that:
/// 1. Loads configuration and wires the backend client, state store, and services
/// 2. Provides command completion for the slash commands
/// 3. Sends chat messages in the background so the prompt stays responsive
/// 4. Displays colored output for user, assistant, and system messages
#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LANTERN_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    // ===== Backend Initialization =====
    let config_service = ConfigService::with_default_path()
        .context("cannot locate the user configuration directory")?;
    let config = config_service.get_config();
    tracing::info!("[Startup] Backend at {}", config.backend_url);

    let backend: Arc<dyn AssistantBackend> = Arc::new(
        BackendClient::from_config(&config).context("failed to build the backend client")?,
    );
    let options = Arc::new(RwLock::new(
        ChatOptions::from_config(&config).context("invalid chat options in configuration")?,
    ));
    let clipboard = Arc::new(RwLock::new(ClipboardAggregator::new()));
    let state: Arc<dyn StateRepository> = Arc::new(
        TomlStateRepository::with_default_path()
            .await
            .context("failed to open the local state store")?,
    );

    let chat = Arc::new(ChatService::new(
        Arc::clone(&backend),
        Arc::clone(&options),
        Arc::clone(&clipboard),
    ));
    let export = ExportService::new(Arc::clone(&backend), Arc::clone(&options), clipboard);
    let training = TrainingService::new(backend, state);

    // ===== REPL Setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== Lantern ===".bright_magenta().bold());
    println!(
        "{}",
        "Chat with your trained datasets. Type /help for commands, 'quit' to exit.".bright_black()
    );
    println!();

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let command = match Command::parse(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.yellow());
                        continue;
                    }
                };

                match dispatch(command, &chat, &export, &training).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("{}", format!("Error: {:#}", e).red()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                chat.cancel_inflight();
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

/// Runs one parsed command against the services.
///
/// Returns `Ok(false)` when the REPL should exit. Chat messages are spawned
/// into the background; their replies print when they arrive. Every other
/// command completes before the next prompt.
async fn dispatch(
    command: Command,
    chat: &Arc<ChatService>,
    export: &ExportService,
    training: &TrainingService,
) -> Result<bool> {
    match command {
        Command::Quit => {
            chat.cancel_inflight();
            println!("{}", "Goodbye!".bright_green());
            return Ok(false);
        }

        Command::Send(text) => {
            println!("{}", format!("> {}", text).green());
            let chat = Arc::clone(chat);
            tokio::spawn(async move {
                match chat.send_user_message(&text).await {
                    Ok(SendOutcome::Replied(reply)) => {
                        for line in reply.lines() {
                            println!("{}", line.bright_blue());
                        }
                    }
                    Ok(SendOutcome::Cancelled) => {
                        println!("{}", "Send cancelled.".yellow());
                    }
                    Ok(SendOutcome::Ignored) => {}
                    Err(e) => eprintln!("{}", format!("Send failed: {}", e).red()),
                }
            });
        }

        // ===== Sessions =====
        Command::NewChat => {
            chat.new_chat().await;
            if let Some(session) = chat.sessions().await.first() {
                println!("{}", format!("Started {}", session.title).green());
            }
        }
        Command::ListChats => {
            let sessions = chat.sessions().await;
            if sessions.is_empty() {
                println!("{}", "No chats yet. /new starts one.".bright_black());
            }
            let active = chat.active_session_id().await;
            for (i, session) in sessions.iter().enumerate() {
                let marker = if Some(&session.id) == active.as_ref() {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{} {}. {} ({} messages)",
                    marker.bright_green(),
                    i + 1,
                    session.title,
                    session.messages.len()
                );
            }
        }
        Command::SelectChat(index) => match session_at(chat, index).await {
            Some((id, title)) => {
                chat.select_chat(&id).await?;
                println!("{}", format!("Switched to {}", title).green());
            }
            None => println!("{}", format!("No chat numbered {}", index + 1).yellow()),
        },
        Command::DeleteChat(index) => match session_at(chat, index).await {
            Some((id, title)) => {
                chat.delete_chat(&id).await;
                println!("{}", format!("Deleted {}", title).green());
            }
            None => println!("{}", format!("No chat numbered {}", index + 1).yellow()),
        },
        Command::RenameChat { index, title } => match session_at(chat, index).await {
            Some((id, _)) => {
                chat.rename_chat(&id, &title).await?;
                println!("{}", format!("Renamed to {}", title).green());
            }
            None => println!("{}", format!("No chat numbered {}", index + 1).yellow()),
        },
        Command::ShowLog => {
            let displayed = chat.displayed().await;
            if displayed.is_empty() {
                println!("{}", "The log is empty.".bright_black());
            }
            for (i, message) in displayed.iter().enumerate() {
                let label = match message.role {
                    MessageRole::User => format!("{}. you:", i + 1).green(),
                    MessageRole::Assistant => format!("{}. assistant:", i + 1).bright_blue(),
                };
                println!("{} {}", label, message.content);
            }
        }

        // ===== Clipboard =====
        Command::CopyReply(index) => {
            let copied = chat.copy_reply_to_clipboard(index).await?;
            println!(
                "{}",
                format!("Copied to clipboard: {}", preview(&copied, 60)).green()
            );
        }
        Command::ShowClipboard => {
            let items = export.items().await;
            if items.is_empty() {
                println!(
                    "{}",
                    "The clipboard is empty. /copy harvests a reply.".bright_black()
                );
            }
            for (i, item) in items.iter().enumerate() {
                let marker = if item.selected { "[x]" } else { "[ ]" };
                println!(
                    "{} {}. {}",
                    marker.bright_cyan(),
                    i + 1,
                    preview(&item.content, 60)
                );
            }
        }
        Command::ToggleSelect(index) => {
            export.toggle_select(index).await?;
            println!("{}", format!("Toggled item {}", index + 1).green());
        }
        Command::DropItem(index) => {
            export.delete_item(index).await?;
            println!("{}", format!("Removed item {}", index + 1).green());
        }
        Command::MergeAll => {
            export.merge_all().await;
            println!(
                "{}",
                format!("Clipboard now holds {} item(s)", export.items().await.len()).green()
            );
        }
        Command::MergeSelected => {
            export.merge_selected().await;
            println!(
                "{}",
                format!("Clipboard now holds {} item(s)", export.items().await.len()).green()
            );
        }

        // ===== Export =====
        Command::Export(format) => {
            let artifact = export.export(format).await?;
            tokio::fs::write(&artifact.file_name, &artifact.bytes)
                .await
                .with_context(|| format!("failed to write {}", artifact.file_name))?;
            println!(
                "{}",
                format!(
                    "Wrote {} ({} bytes)",
                    artifact.file_name,
                    artifact.bytes.len()
                )
                .green()
            );
        }
        Command::Summarize => {
            println!("{}", "Summarizing clipboard...".bright_black());
            let summary = export.summarize_clipboard().await?;
            for line in summary.lines() {
                println!("{}", line.bright_blue());
            }
        }

        // ===== Datasets =====
        Command::Datasets => {
            let local = training.local_datasets().await;
            if !local.is_empty() {
                println!("{}", "Trained from here:".bright_black());
                for name in &local {
                    println!("  {}", name);
                }
            }
            let remote = training.remote_datasets().await?;
            println!("{}", "On the backend:".bright_black());
            if remote.is_empty() {
                println!("  {}", "(none)".bright_black());
            }
            for name in remote {
                println!("  {}", name);
            }
        }
        Command::Models(provider) => {
            let provider = match provider {
                Some(provider) => provider,
                None => chat.options().await.provider,
            };
            let models = training.models(provider).await?;
            println!("{}", format!("Models for {}:", provider).bright_black());
            for model in models {
                println!("  {}", model);
            }
        }
        Command::Upload { dataset, paths } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path))?;
                let file_name = Path::new(path)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.clone());
                files.push(UploadFile { file_name, bytes });
            }
            println!(
                "{}",
                format!("Uploading {} file(s) to '{}'...", files.len(), dataset).bright_black()
            );
            let message = training.upload(&dataset, files).await?;
            println!("{}", message.green());
        }
        Command::Train(dataset) => {
            println!(
                "{}",
                format!("Training '{}' (this can take a while)...", dataset).bright_black()
            );
            let message = training.train(&dataset).await?;
            println!("{}", message.green());
        }
        Command::Query(text) => {
            let options = chat.options().await;
            let hits = training
                .query(&options.dataset, &text, options.top_k)
                .await?;
            if hits.is_empty() {
                println!("{}", "No hits.".bright_black());
            }
            for hit in hits {
                println!(
                    "{} {}",
                    format!("{:.3}", hit.score).bright_cyan(),
                    preview(&hit.text, 100)
                );
            }
        }

        // ===== Options =====
        Command::ShowOptions => {
            let options = chat.options().await;
            println!("  dataset:  {}", options.dataset);
            println!("  provider: {}", options.provider);
            println!("  model:    {}", options.model);
            println!("  top_k:    {}", options.top_k);
        }
        Command::SetDataset(name) => {
            chat.set_dataset(name.clone()).await;
            println!("{}", format!("Dataset set to '{}'", name).green());
        }
        Command::SetProvider(provider) => {
            chat.set_provider(provider).await;
            println!(
                "{}",
                format!("Provider set to '{}'. /models lists its models.", provider).green()
            );
        }
        Command::SetModel(model) => {
            chat.set_model(model.clone()).await;
            println!("{}", format!("Model set to '{}'", model).green());
        }
        Command::SetTopK(value) => {
            chat.set_top_k(value).await;
            println!("{}", format!("top_k set to {}", value).green());
        }

        Command::Help => {
            for (usage, description) in COMMANDS {
                println!("  {} {}", format!("{:<28}", usage).bright_cyan(), description);
            }
            println!("  {}", "Anything else is sent to the assistant.".bright_black());
        }
    }

    Ok(true)
}

/// Resolves a 0-based listing index to the session's id and title.
async fn session_at(chat: &ChatService, index: usize) -> Option<(String, String)> {
    chat.sessions()
        .await
        .get(index)
        .map(|session| (session.id.clone(), session.title.clone()))
}

/// First line of `text`, truncated to `max` characters for one-line listings.
fn preview(text: &str, max: usize) -> String {
    let first = text.lines().next().unwrap_or("");
    let mut out: String = first.chars().take(max).collect();
    if first.chars().count() > max || text.lines().nth(1).is_some() {
        out.push_str("...");
    }
    out
}
