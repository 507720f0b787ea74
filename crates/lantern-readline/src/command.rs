//! REPL input parsing.
//!
//! Every input line becomes a tagged `Command`, so the dispatch in `main`
//! is a single match instead of string checks scattered through the loop.
//! Slash commands address chats, clipboard items, and log messages by the
//! 1-based numbers the listings print; the parsed variants carry 0-based
//! indices ready for the stores.

use std::str::FromStr;

use lantern_core::export::ExportFormat;
use lantern_interaction::LlmProvider;

/// Command names with argument shape and a help line, in `/help` order.
pub const COMMANDS: [(&str, &str); 25] = [
    ("/new", "start a new chat"),
    ("/chats", "list chats"),
    ("/select <n>", "switch to chat n"),
    ("/delete <n>", "delete chat n"),
    ("/rename <n> <title>", "rename chat n"),
    ("/log", "show the current message log"),
    ("/copy [n]", "copy an assistant reply (latest, or message n) to the clipboard"),
    ("/clip", "show clipboard items"),
    ("/toggle <n>", "toggle selection of clipboard item n"),
    ("/drop <n>", "delete clipboard item n"),
    ("/merge [selected]", "merge all clipboard items, or only the selected ones"),
    ("/export <pdf|doc|txt|json>", "write the clipboard to a file"),
    ("/summarize", "summarize the clipboard via the backend"),
    ("/datasets", "list backend datasets and datasets trained from here"),
    ("/models [provider]", "list models for the current or given provider"),
    ("/upload <dataset> <file...>", "upload files into a dataset"),
    ("/train <dataset>", "train an uploaded dataset"),
    ("/query <text>", "preview retrieval hits for the current dataset"),
    ("/options", "show chat options"),
    ("/dataset <name>", "set the dataset"),
    ("/provider <groq|gemini|openai>", "set the provider"),
    ("/model <name>", "set the model"),
    ("/topk <n>", "set the retrieval depth"),
    ("/help", "show this help"),
    ("quit", "exit"),
];

/// A parsed input line.
///
/// Anything that does not start with `/` (and is not a quit alias) is a
/// chat message for the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text sent to the assistant.
    Send(String),
    NewChat,
    ListChats,
    SelectChat(usize),
    DeleteChat(usize),
    RenameChat { index: usize, title: String },
    /// Show the displayed message log with message numbers.
    ShowLog,
    /// Copy an assistant reply into the clipboard; `None` takes the latest.
    CopyReply(Option<usize>),
    ShowClipboard,
    ToggleSelect(usize),
    DropItem(usize),
    MergeAll,
    MergeSelected,
    Export(ExportFormat),
    Summarize,
    Datasets,
    /// List models; `None` uses the currently configured provider.
    Models(Option<LlmProvider>),
    Upload { dataset: String, paths: Vec<String> },
    Train(String),
    Query(String),
    ShowOptions,
    SetDataset(String),
    SetProvider(LlmProvider),
    SetModel(String),
    SetTopK(u32),
    Help,
    Quit,
}

impl Command {
    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message (usage or complaint) when the line is
    /// a malformed slash command.
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();

        if matches!(line, "quit" | "exit" | "/quit" | "/exit") {
            return Ok(Command::Quit);
        }
        if !line.starts_with('/') {
            return Ok(Command::Send(line.to_string()));
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        match head {
            "/new" => Ok(Command::NewChat),
            "/chats" => Ok(Command::ListChats),
            "/select" => Ok(Command::SelectChat(index_arg(rest, "/select <n>")?)),
            "/delete" => Ok(Command::DeleteChat(index_arg(rest, "/delete <n>")?)),
            "/rename" => {
                let (number, title) = rest
                    .split_once(' ')
                    .ok_or("Usage: /rename <n> <title>")?;
                let title = title.trim();
                if title.is_empty() {
                    return Err("Usage: /rename <n> <title>".to_string());
                }
                Ok(Command::RenameChat {
                    index: index_arg(number, "/rename <n> <title>")?,
                    title: title.to_string(),
                })
            }
            "/log" => Ok(Command::ShowLog),
            "/copy" => {
                if rest.is_empty() {
                    Ok(Command::CopyReply(None))
                } else {
                    Ok(Command::CopyReply(Some(index_arg(rest, "/copy [n]")?)))
                }
            }
            "/clip" => Ok(Command::ShowClipboard),
            "/toggle" => Ok(Command::ToggleSelect(index_arg(rest, "/toggle <n>")?)),
            "/drop" => Ok(Command::DropItem(index_arg(rest, "/drop <n>")?)),
            "/merge" => match rest {
                "" => Ok(Command::MergeAll),
                "selected" => Ok(Command::MergeSelected),
                _ => Err("Usage: /merge [selected]".to_string()),
            },
            "/export" => {
                let format = ExportFormat::from_str(text_arg(
                    rest,
                    "/export <pdf|doc|txt|json>",
                )?)
                .map_err(|e| e.to_string())?;
                Ok(Command::Export(format))
            }
            "/summarize" => Ok(Command::Summarize),
            "/datasets" => Ok(Command::Datasets),
            "/models" => {
                if rest.is_empty() {
                    Ok(Command::Models(None))
                } else {
                    let provider = LlmProvider::from_str(rest).map_err(|e| e.to_string())?;
                    Ok(Command::Models(Some(provider)))
                }
            }
            "/upload" => {
                let mut words = rest.split_whitespace();
                let dataset = words
                    .next()
                    .ok_or("Usage: /upload <dataset> <file...>")?
                    .to_string();
                let paths: Vec<String> = words.map(str::to_string).collect();
                if paths.is_empty() {
                    return Err("Usage: /upload <dataset> <file...>".to_string());
                }
                Ok(Command::Upload { dataset, paths })
            }
            "/train" => Ok(Command::Train(
                text_arg(rest, "/train <dataset>")?.to_string(),
            )),
            "/query" => Ok(Command::Query(
                text_arg(rest, "/query <text>")?.to_string(),
            )),
            "/options" => Ok(Command::ShowOptions),
            "/dataset" => Ok(Command::SetDataset(
                text_arg(rest, "/dataset <name>")?.to_string(),
            )),
            "/provider" => {
                let provider = LlmProvider::from_str(text_arg(
                    rest,
                    "/provider <groq|gemini|openai>",
                )?)
                .map_err(|e| e.to_string())?;
                Ok(Command::SetProvider(provider))
            }
            "/model" => Ok(Command::SetModel(
                text_arg(rest, "/model <name>")?.to_string(),
            )),
            "/topk" => {
                let value: u32 = rest
                    .parse()
                    .map_err(|_| "Usage: /topk <n>".to_string())?;
                if value == 0 {
                    return Err("top_k must be at least 1".to_string());
                }
                Ok(Command::SetTopK(value))
            }
            "/help" => Ok(Command::Help),
            other => Err(format!(
                "Unknown command: {}. Type /help for the list.",
                other
            )),
        }
    }
}

/// Parses a 1-based listing number into a 0-based index.
fn index_arg(rest: &str, usage: &str) -> Result<usize, String> {
    let number: usize = rest
        .trim()
        .parse()
        .map_err(|_| format!("Usage: {}", usage))?;
    if number == 0 {
        return Err("Numbers start at 1".to_string());
    }
    Ok(number - 1)
}

/// Requires a non-empty argument string.
fn text_arg<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        return Err(format!("Usage: {}", usage));
    }
    Ok(rest)
}
