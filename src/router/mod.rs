//! Command router: authorization, parsing, list mutation, and replies.
//!
//! Every command does exactly one [`TaskStore::load`]; mutating commands
//! follow it with exactly one [`TaskStore::save`]. Nothing guards the
//! load/modify/save sequence, so two overlapping mutations race and the
//! later save wins.

pub mod command;
pub mod render;

use crate::config::SaveFailurePolicy;
use crate::digest::{Clock, compose_digest, today_list};
use crate::router::command::{CommandError, ParsedCommand, parse};
use crate::router::render::{HELP_TEXT, UNKNOWN_COMMAND, escape_markdown, render_all, render_list};
use crate::storage::TaskStore;
use chrono::FixedOffset;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reply sent under [`SaveFailurePolicy::ReportFailure`] when a save fails.
pub const SAVE_FAILED: &str = "Sorry, I couldn't save that change. Please try again.";

/// Dispatches chat commands from the single authorized chat.
pub struct Router {
    store: Arc<dyn TaskStore>,
    authorized_chat: i64,
    save_failure_policy: SaveFailurePolicy,
    utc_offset: FixedOffset,
    clock: Clock,
}

impl Router {
    pub fn new(store: Arc<dyn TaskStore>, authorized_chat: i64, utc_offset: FixedOffset) -> Self {
        Self {
            store,
            authorized_chat,
            save_failure_policy: SaveFailurePolicy::default(),
            utc_offset,
            clock: crate::digest::system_clock(),
        }
    }

    pub fn with_save_failure_policy(mut self, policy: SaveFailurePolicy) -> Self {
        self.save_failure_policy = policy;
        self
    }

    /// Override the time source used by `/today`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Handle one command line from `sender`.
    ///
    /// Returns `None` for anyone but the authorized chat; such calls touch
    /// neither the parser nor storage.
    pub async fn handle(&self, line: &str, sender: i64) -> Option<String> {
        if sender != self.authorized_chat {
            debug!("dropping message from unauthorized chat {sender}");
            return None;
        }

        let reply = match parse(line) {
            Ok(command) => {
                debug!(mutating = command.is_mutating(), "executing {command:?}");
                self.execute(command).await
            }
            Err(err) => err.to_string(),
        };
        Some(reply)
    }

    async fn execute(&self, command: ParsedCommand) -> String {
        match command {
            ParsedCommand::Help => HELP_TEXT.to_owned(),
            ParsedCommand::Unknown { name } => {
                debug!("unknown command `{name}`");
                UNKNOWN_COMMAND.to_owned()
            }
            ParsedCommand::Lists => render_all(&self.store.load().await),
            ParsedCommand::View { list } => render_list(&self.store.load().await, list),
            ParsedCommand::Today => {
                let list = today_list((self.clock)(), self.utc_offset);
                compose_digest(&self.store.load().await, list)
            }
            ParsedCommand::Add { list, task } => {
                let mut doc = self.store.load().await;
                doc.add(list, task.clone());
                info!("adding task to {list} list");
                let confirmation = format!("Added to *{list}*: {}", escape_markdown(&task));
                self.persist(&doc, confirmation).await
            }
            ParsedCommand::Edit {
                list,
                position,
                text,
            } => {
                let mut doc = self.store.load().await;
                let len = doc.list(list).len();
                let Some(old) = doc.replace(list, position, text.clone()) else {
                    return CommandError::OutOfRange {
                        list,
                        position,
                        len,
                    }
                    .to_string();
                };
                info!("editing task #{position} in {list} list");
                let confirmation = format!(
                    "Updated *{list}* #{position}:\n{} → {}",
                    escape_markdown(&old),
                    escape_markdown(&text)
                );
                self.persist(&doc, confirmation).await
            }
            ParsedCommand::Remove { list, position } => {
                let mut doc = self.store.load().await;
                let len = doc.list(list).len();
                let Some(removed) = doc.remove(list, position) else {
                    return CommandError::OutOfRange {
                        list,
                        position,
                        len,
                    }
                    .to_string();
                };
                info!("removing task #{position} from {list} list");
                let confirmation =
                    format!("Removed from *{list}*: {}", escape_markdown(&removed));
                self.persist(&doc, confirmation).await
            }
        }
    }

    async fn persist(&self, doc: &crate::tasks::TaskDocument, confirmation: String) -> String {
        match self.store.save(doc).await {
            Ok(()) => confirmation,
            Err(err) => {
                warn!(
                    "cannot save task document to {}: {err}",
                    self.store.backend()
                );
                match self.save_failure_policy {
                    SaveFailurePolicy::ReportSuccess => confirmation,
                    SaveFailurePolicy::ReportFailure => SAVE_FAILED.to_owned(),
                }
            }
        }
    }
}
