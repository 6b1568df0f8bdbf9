//! engine::aggregate
//!
//! Groups notes by type and orders them for rendering.
//!
//! # Ordering
//!
//! [`compare_notes`] is the single comparator used everywhere: type, then
//! issue (as strings, so `"10"` precedes `"2"`), then position within the
//! entry, then body. The flat list and every per-type bucket are sorted
//! with it, so notes sharing a type appear in the same relative order in
//! both views.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::notes::notes_from_entry;
use crate::core::types::{Entry, Note};

/// Notes grouped by type, each bucket sorted by [`compare_notes`].
pub type NotesByType = BTreeMap<String, Vec<Note>>;

/// Render data: every note in order, and the same notes grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Changelog {
    /// All notes, sorted by [`compare_notes`]
    pub notes: Vec<Note>,
    /// Notes grouped by type
    pub notes_by_type: NotesByType,
}

impl Changelog {
    /// Whether there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Total order over notes.
pub fn compare_notes(a: &Note, b: &Note) -> Ordering {
    a.note_type
        .cmp(&b.note_type)
        .then_with(|| a.issue.cmp(&b.issue))
        .then_with(|| a.position.cmp(&b.position))
        .then_with(|| a.body.cmp(&b.body))
}

/// Group and order notes.
pub fn aggregate(mut notes: Vec<Note>) -> Changelog {
    let mut notes_by_type = NotesByType::new();
    for note in &notes {
        notes_by_type
            .entry(note.note_type.clone())
            .or_default()
            .push(note.clone());
    }

    let compare: fn(&Note, &Note) -> Ordering = compare_notes;
    for bucket in notes_by_type.values_mut() {
        bucket.sort_by(compare);
    }
    notes.sort_by(compare);

    Changelog {
        notes,
        notes_by_type,
    }
}

/// Parse every entry and aggregate the resulting notes.
///
/// # Example
///
/// ```
/// use changelog_build::core::types::Entry;
/// use changelog_build::engine::build_changelog;
///
/// let changelog = build_changelog(&[
///     Entry::new("2", "[bug] Fixed"),
///     Entry::new("10", "[bug] Also fixed\n[feature] Added"),
/// ]);
///
/// assert_eq!(changelog.notes.len(), 3);
/// assert_eq!(changelog.notes_by_type["bug"][0].issue, "10");
/// ```
pub fn build_changelog(entries: &[Entry]) -> Changelog {
    aggregate(entries.iter().flat_map(notes_from_entry).collect())
}
