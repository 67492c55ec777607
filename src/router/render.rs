//! Telegram-flavoured text rendering (legacy `Markdown` parse mode).

use crate::tasks::{ListName, TaskDocument};

/// Line shown in place of an empty list.
pub const EMPTY_PLACEHOLDER: &str = "_(no tasks)_";

pub const HELP_TEXT: &str = "*Dayplan commands*
/lists - show both lists
/view <weekday|weekend> - show one list
/add <weekday|weekend> <task> - add a task
/edit <weekday|weekend> <number> <new text> - change a task
/remove <weekday|weekend> <number> - delete a task
/today - show today's list
/help - show this message";

pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help to see what I understand.";

/// Backslash-escape the characters legacy Markdown treats as markup.
///
/// Legacy Markdown has no escape for `\` itself, so a backslash already in
/// the text is passed through unchanged. A task typed as `a\_b` is sent as
/// `a\\_b`; whether the client shows the backslash depends on its parser.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Numbered items, one per line, or the empty placeholder.
pub fn render_items(items: &[String]) -> String {
    if items.is_empty() {
        return EMPTY_PLACEHOLDER.to_owned();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, escape_markdown(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A bold heading followed by the list's items.
pub fn render_list(doc: &TaskDocument, list: ListName) -> String {
    format!("*{}*\n{}", list.title(), render_items(doc.list(list)))
}

/// Both lists, separated by a blank line.
pub fn render_all(doc: &TaskDocument) -> String {
    ListName::ALL
        .iter()
        .map(|list| render_list(doc, *list))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_are_numbered_from_one() {
        let items = vec!["Buy milk".to_owned(), "Walk dog".to_owned()];
        assert_eq!(render_items(&items), "1. Buy milk\n2. Walk dog");
    }

    #[test]
    fn empty_list_renders_placeholder() {
        let doc = TaskDocument::default();
        assert_eq!(render_list(&doc, ListName::Weekend), "*Weekend*\n_(no tasks)_");
    }

    #[test]
    fn markup_characters_are_escaped() {
        assert_eq!(escape_markdown("a_b*c`d[e]"), "a\\_b\\*c\\`d\\[e]");
        assert_eq!(escape_markdown("plain text"), "plain text");
    }

    #[test]
    fn existing_backslash_is_left_alone() {
        assert_eq!(escape_markdown("a\\_b"), "a\\\\_b");
        assert_eq!(escape_markdown("C:\\tmp"), "C:\\tmp");
    }

    #[test]
    fn render_all_shows_weekday_then_weekend() {
        let doc = TaskDocument {
            weekday: vec!["work".to_owned()],
            weekend: Vec::new(),
        };
        assert_eq!(
            render_all(&doc),
            "*Weekday*\n1. work\n\n*Weekend*\n_(no tasks)_"
        );
    }
}
