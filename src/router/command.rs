//! Chat command tokenizer and per-command validation.

use crate::router::render::escape_markdown;
use crate::tasks::ListName;

pub const VIEW_USAGE: &str = "/view <weekday|weekend>";
pub const ADD_USAGE: &str = "/add <weekday|weekend> <task>";
pub const EDIT_USAGE: &str = "/edit <weekday|weekend> <number> <new text>";
pub const REMOVE_USAGE: &str = "/remove <weekday|weekend> <number>";

/// A fully validated chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Help,
    Lists,
    Today,
    View {
        list: ListName,
    },
    Add {
        list: ListName,
        task: String,
    },
    Edit {
        list: ListName,
        /// 1-based position.
        position: usize,
        text: String,
    },
    Remove {
        list: ListName,
        /// 1-based position.
        position: usize,
    },
    Unknown {
        name: String,
    },
}

impl ParsedCommand {
    /// Whether executing this command rewrites the stored document.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Add { .. } | Self::Edit { .. } | Self::Remove { .. }
        )
    }
}

/// User-facing validation failure. The `Display` text is sent back as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Usage: `{0}`")]
    Usage(&'static str),

    #[error("Unknown list \"{}\". Use weekday or weekend.", escape_markdown(.0))]
    UnknownList(String),

    #[error("\"{}\" is not a valid task number. Numbers start at 1.", escape_markdown(.0))]
    InvalidIndex(String),

    #[error("Task text can't be empty. Usage: `{0}`")]
    EmptyText(&'static str),

    #[error("There is no task #{position} in the {list} list (it has {len}).")]
    OutOfRange {
        list: ListName,
        position: usize,
        len: usize,
    },
}

/// Split a raw line into a lowercase command name and its arguments.
///
/// A Telegram `@botname` suffix on the command is dropped.
pub fn tokenize(line: &str) -> (String, Vec<&str>) {
    let mut tokens = line.split_whitespace();
    let name = tokens
        .next()
        .map(|first| {
            let bare = first.split_once('@').map_or(first, |(cmd, _)| cmd);
            bare.to_lowercase()
        })
        .unwrap_or_default();
    (name, tokens.collect())
}

/// Parse and validate one command line.
pub fn parse(line: &str) -> Result<ParsedCommand, CommandError> {
    let (name, args) = tokenize(line);
    match name.as_str() {
        "/help" | "/start" => Ok(ParsedCommand::Help),
        "/lists" => Ok(ParsedCommand::Lists),
        "/today" => Ok(ParsedCommand::Today),
        "/view" => {
            let list = list_arg(&args, VIEW_USAGE)?;
            Ok(ParsedCommand::View { list })
        }
        "/add" => {
            let list = list_arg(&args, ADD_USAGE)?;
            let task = text_arg(&args[1..], ADD_USAGE)?;
            Ok(ParsedCommand::Add { list, task })
        }
        "/edit" => {
            let list = list_arg(&args, EDIT_USAGE)?;
            let position = position_arg(&args, EDIT_USAGE)?;
            let text = text_arg(&args[2..], EDIT_USAGE)?;
            Ok(ParsedCommand::Edit {
                list,
                position,
                text,
            })
        }
        "/remove" => {
            let list = list_arg(&args, REMOVE_USAGE)?;
            let position = position_arg(&args, REMOVE_USAGE)?;
            Ok(ParsedCommand::Remove { list, position })
        }
        _ => Ok(ParsedCommand::Unknown { name }),
    }
}

fn list_arg(args: &[&str], usage: &'static str) -> Result<ListName, CommandError> {
    let raw = args.first().ok_or(CommandError::Usage(usage))?;
    raw.parse()
        .map_err(|()| CommandError::UnknownList((*raw).to_owned()))
}

// Range checking against the list happens later, once the document is loaded.
fn position_arg(args: &[&str], usage: &'static str) -> Result<usize, CommandError> {
    let raw = args.get(1).ok_or(CommandError::Usage(usage))?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) || raw.bytes().all(|b| b == b'0') {
        return Err(CommandError::InvalidIndex((*raw).to_owned()));
    }
    // Digits too large for usize are still past the end of any list.
    Ok(raw.parse::<usize>().unwrap_or(usize::MAX))
}

fn text_arg(words: &[&str], usage: &'static str) -> Result<String, CommandError> {
    let text = words.join(" ");
    let text = text.trim();
    if text.is_empty() {
        return Err(CommandError::EmptyText(usage));
    }
    Ok(text.to_owned())
}
