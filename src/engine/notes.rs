//! engine::notes
//!
//! Splits entry bodies into typed notes.
//!
//! # Format
//!
//! An entry body may mix two shapes:
//!
//! ````text
//! ```release-note:bug
//! Fixed a crash when the config file is empty
//! ```
//! [improvement] Faster startup
//! Plain lines become notes of the default type
//! ````
//!
//! - A fenced `release-note:TYPE` block becomes one note of that type; its
//!   inner lines are joined and trimmed. An unterminated block runs to the
//!   end of the body.
//! - A line starting with `[TYPE]` becomes one note of that type.
//! - Any other non-blank line becomes a note of [`DEFAULT_NOTE_TYPE`].
//!
//! Types are trimmed and lower-cased.

use crate::core::types::{Entry, Note};

/// Type given to lines that carry no tag.
pub const DEFAULT_NOTE_TYPE: &str = "note";

const FENCE: &str = "```";
const FENCE_PREFIX: &str = "```release-note:";

/// Parse an entry into notes, in source order.
///
/// # Example
///
/// ```
/// use changelog_build::core::types::Entry;
/// use changelog_build::engine::notes_from_entry;
///
/// let entry = Entry::new("12", "```release-note:bug\nFixed a crash\n```\n[feature] New flag\n");
/// let notes = notes_from_entry(&entry);
///
/// assert_eq!(notes.len(), 2);
/// assert_eq!(notes[0].note_type, "bug");
/// assert_eq!(notes[1].note_type, "feature");
/// assert!(notes.iter().all(|n| n.issue == "12"));
/// ```
pub fn notes_from_entry(entry: &Entry) -> Vec<Note> {
    let mut notes = Vec::new();
    let mut push = |note_type: &str, body: String| {
        if body.is_empty() {
            return;
        }
        notes.push(Note {
            note_type: normalize_type(note_type),
            body,
            issue: entry.issue.clone(),
            position: notes.len(),
        });
    };

    let mut lines = entry.body.lines();
    while let Some(line) = lines.next() {
        let trimmed = line.trim();

        if let Some(note_type) = trimmed.strip_prefix(FENCE_PREFIX) {
            let block: Vec<&str> = lines
                .by_ref()
                .take_while(|l| l.trim() != FENCE)
                .collect();
            push(note_type, block.join("\n").trim().to_string());
            continue;
        }

        if trimmed.is_empty() {
            continue;
        }

        match parse_tag(trimmed) {
            Some((note_type, body)) => push(note_type, body.to_string()),
            None => push(DEFAULT_NOTE_TYPE, trimmed.to_string()),
        }
    }

    notes
}

/// Split `[type] body` into its parts.
///
/// Returns `None` when the line has no tag or the tag is empty.
fn parse_tag(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('[')?;
    let (tag, body) = rest.split_once(']')?;
    if tag.trim().is_empty() {
        return None;
    }
    Some((tag, body.trim()))
}

fn normalize_type(note_type: &str) -> String {
    let note_type = note_type.trim();
    if note_type.is_empty() {
        DEFAULT_NOTE_TYPE.to_string()
    } else {
        note_type.to_lowercase()
    }
}
