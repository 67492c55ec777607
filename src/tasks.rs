//! The persisted task document and the two list names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two named task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListName {
    Weekday,
    Weekend,
}

impl ListName {
    /// Both lists in display order.
    pub const ALL: [ListName; 2] = [ListName::Weekday, ListName::Weekend];

    /// Lowercase identifier, as typed by the user and stored in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekday => "weekday",
            Self::Weekend => "weekend",
        }
    }

    /// Capitalised heading used when rendering.
    pub fn title(self) -> &'static str {
        match self {
            Self::Weekday => "Weekday",
            Self::Weekend => "Weekend",
        }
    }
}

impl fmt::Display for ListName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekday" => Ok(Self::Weekday),
            "weekend" => Ok(Self::Weekend),
            _ => Err(()),
        }
    }
}

/// The whole persisted state: two ordered lists of task descriptions.
///
/// Tasks have no identity beyond their position, so removing an entry
/// renumbers everything after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub weekday: Vec<String>,
    #[serde(default)]
    pub weekend: Vec<String>,
}

impl TaskDocument {
    /// Parse a document, falling back to the empty document on anything
    /// that is not a JSON object with (optional) string-array fields.
    pub fn from_json_lenient(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("task document is malformed, using empty document: {e}");
                Self::default()
            }
        }
    }

    pub fn list(&self, name: ListName) -> &[String] {
        match name {
            ListName::Weekday => &self.weekday,
            ListName::Weekend => &self.weekend,
        }
    }

    pub fn list_mut(&mut self, name: ListName) -> &mut Vec<String> {
        match name {
            ListName::Weekday => &mut self.weekday,
            ListName::Weekend => &mut self.weekend,
        }
    }

    /// Append a task to the end of a list.
    pub fn add(&mut self, name: ListName, task: impl Into<String>) {
        self.list_mut(name).push(task.into());
    }

    /// Replace the task at 1-based `position`, returning the old text.
    ///
    /// Returns `None` (and leaves the list untouched) when the position
    /// does not exist.
    pub fn replace(&mut self, name: ListName, position: usize, text: String) -> Option<String> {
        let slot = self.list_mut(name).get_mut(position.checked_sub(1)?)?;
        Some(std::mem::replace(slot, text))
    }

    /// Remove the task at 1-based `position`, shifting later tasks down.
    pub fn remove(&mut self, name: ListName, position: usize) -> Option<String> {
        let offset = position.checked_sub(1)?;
        let list = self.list_mut(name);
        (offset < list.len()).then(|| list.remove(offset))
    }
}
