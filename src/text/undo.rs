//! Undo records and the linear undo/redo history.
//!
//! Each [`UndoRecord`] carries exactly what is needed to reverse one edit.
//! The buffer applies a record's inverse while the history is in the
//! [`UndoState::Undo`] or [`UndoState::Redo`] state; that inverse edit pushes
//! its own record through [`UndoHistory::new_undo`], which swaps it into the
//! slot the original came from. Undoing and redoing are therefore the same
//! operation seen from opposite ends of the list.

use crate::font::Font;

use super::index::{TextCount, TextIndex, TextRange};
use super::runs::RunArray;

/// Default number of undo steps retained.
pub const DEFAULT_MAX_UNDO_COUNT: usize = 100;

/// Text that was replaced, and where its replacement now lives.
#[derive(Clone, Debug, PartialEq)]
pub struct Replacement {
    /// Range currently occupied by the new content.
    pub range: TextRange,
    /// Content that `range` held before the edit.
    pub text: String,
    /// Styles of `text`, one per character.
    pub styles: RunArray<Font>,
}

impl Replacement {
    /// Record that `range` is about to be replaced; `text`/`styles` are its current content.
    #[must_use]
    pub fn new(range: TextRange, text: String, styles: RunArray<Font>) -> Self {
        debug_assert_eq!(text.chars().count(), styles.len());
        Self {
            range,
            text,
            styles,
        }
    }

    /// Nothing has been replaced yet; new content will start at `start`.
    #[must_use]
    pub fn at(start: TextIndex) -> Self {
        Self::new(TextRange::empty_at(start), String::new(), RunArray::new())
    }

    /// Typing continues at the caret this record ends at.
    #[must_use]
    pub fn matches_current_index(&self, index: TextIndex) -> bool {
        self.range.after() == index
    }

    /// `count` more characters were typed at the end of the range.
    pub fn handle_characters(&mut self, count: TextCount) {
        self.range += count;
    }

    /// A backspace removed `deleted`, which ended at the caret.
    ///
    /// Characters typed under this record are simply forgotten; anything
    /// deleted from before the record's start is older content and is kept
    /// so undo can restore it.
    pub fn handle_delete(&mut self, deleted: &str, styles: &RunArray<Font>) {
        let count = TextCount::of(deleted);
        let typed = self.range.count();
        if count.chars <= typed.chars {
            self.range.chars.end -= count.chars;
            self.range.bytes.end -= count.bytes;
            return;
        }

        let older_chars = count.chars - typed.chars;
        let older_bytes = count.bytes - typed.bytes;
        let mut text = deleted[..older_bytes].to_string();
        text.push_str(&self.text);
        let mut older = styles.slice(0..older_chars);
        older.append(&self.styles);

        self.text = text;
        self.styles = older;
        let start = self.range.first() - TextCount::new(older_chars, older_bytes);
        self.range = TextRange::empty_at(start);
    }

    /// A forward delete removed `deleted`, which started at the caret.
    pub fn handle_forward_delete(&mut self, deleted: &str, styles: &RunArray<Font>) {
        self.text.push_str(deleted);
        self.styles.append(styles);
    }
}

/// A reversible edit.
#[derive(Clone, Debug, PartialEq)]
pub enum UndoRecord {
    /// Consecutive typing and deleting at one caret.
    Typing(Replacement),
    /// Replacement of a range by pasted text.
    Paste(Replacement),
    /// Indent/outdent of whole lines.
    TabShift(Replacement),
    /// `count` characters moved; undo moves them from `dest` back to `src`.
    Move {
        src: TextIndex,
        dest: TextIndex,
        count: TextCount,
    },
    /// Style-only change; `styles` is what `range` looked like before.
    Style {
        range: TextRange,
        styles: RunArray<Font>,
    },
}

impl UndoRecord {
    /// Short name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Typing(_) => "typing",
            Self::Paste(_) => "paste",
            Self::TabShift(_) => "tab-shift",
            Self::Move { .. } => "move",
            Self::Style { .. } => "style",
        }
    }

    /// Rewrite the name and size of every stored font.
    pub fn set_font_name_and_size(&mut self, name: &str, size: u16) {
        let styles = match self {
            Self::Typing(r) | Self::Paste(r) | Self::TabShift(r) => &mut r.styles,
            Self::Style { styles, .. } => styles,
            Self::Move { .. } => return,
        };
        let len = styles.len();
        styles.map_range(0..len, |font| font.clone().with_name(name).with_size(size));
    }
}

/// What the history is doing right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UndoState {
    #[default]
    Idle,
    Undo,
    Redo,
}

#[derive(Clone, Debug)]
struct Entry {
    record: UndoRecord,
    /// Cleared once the record may no longer be extended.
    active: bool,
}

impl Entry {
    const fn new(record: UndoRecord) -> Self {
        Self {
            record,
            active: true,
        }
    }
}

/// Undo/redo history.
///
/// In multiple-undo mode `list[..first_redo]` are undo steps (newest last)
/// and `list[first_redo..]` are redo steps. In single-undo mode one slot
/// holds the latest record, and undoing it swaps in its inverse so the next
/// undo acts as a redo.
#[derive(Clone, Debug)]
pub struct UndoHistory {
    list: Vec<Entry>,
    first_redo: usize,
    single: Option<Entry>,
    multiple: bool,
    /// `first_redo` at the last save, if that point is still reachable.
    last_save: Option<usize>,
    max_depth: usize,
    state: UndoState,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(true, DEFAULT_MAX_UNDO_COUNT)
    }
}

impl UndoHistory {
    #[must_use]
    pub fn new(multiple: bool, max_depth: usize) -> Self {
        assert!(max_depth > 0, "undo depth must be positive");
        Self {
            list: Vec::new(),
            first_redo: 0,
            single: None,
            multiple,
            last_save: Some(0),
            max_depth,
            state: UndoState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> UndoState {
        self.state
    }

    #[must_use]
    pub const fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Switch between single and multiple undo; any history is discarded.
    pub fn set_multiple(&mut self, multiple: bool) {
        if multiple != self.multiple {
            self.clear();
            self.multiple = multiple;
        }
    }

    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the depth limit, pruning immediately if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        assert!(max_depth > 0, "undo depth must be positive");
        self.max_depth = max_depth;
        self.prune();
    }

    /// Number of records in the list (undo plus redo).
    #[must_use]
    pub fn len(&self) -> usize {
        if self.multiple {
            self.list.len()
        } else {
            usize::from(self.single.is_some())
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first redo entry.
    #[must_use]
    pub const fn first_redo(&self) -> usize {
        self.first_redo
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        if self.multiple {
            self.first_redo > 0
        } else {
            self.single.is_some()
        }
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        if self.multiple {
            self.first_redo < self.list.len()
        } else {
            self.single.is_some()
        }
    }

    fn current_undo_entry(&mut self) -> Option<&mut Entry> {
        if !self.multiple {
            self.single.as_mut()
        } else if self.first_redo > 0 {
            self.list.get_mut(self.first_redo - 1)
        } else {
            None
        }
    }

    fn current_redo_entry(&mut self) -> Option<&mut Entry> {
        if self.multiple {
            self.list.get_mut(self.first_redo)
        } else {
            self.single.as_mut()
        }
    }

    /// The newest undo record, if it is still active and may be extended.
    pub fn active_undo_mut(&mut self) -> Option<&mut UndoRecord> {
        if self.state != UndoState::Idle {
            return None;
        }
        self.current_undo_entry()
            .filter(|entry| entry.active)
            .map(|entry| &mut entry.record)
    }

    /// Seal the newest undo record so later edits start a new one.
    pub fn deactivate_current(&mut self) {
        if let Some(entry) = self.current_undo_entry() {
            entry.active = false;
        }
    }

    /// Enter the undo state and return the record to reverse.
    ///
    /// # Panics
    ///
    /// Panics if an undo or redo is already running.
    pub fn begin_undo(&mut self) -> Option<UndoRecord> {
        assert_eq!(self.state, UndoState::Idle, "nested undo");
        let entry = self.current_undo_entry()?;
        entry.active = false;
        let record = entry.record.clone();
        self.state = UndoState::Undo;
        Some(record)
    }

    /// Enter the redo state and return the record to reverse.
    ///
    /// # Panics
    ///
    /// Panics if an undo or redo is already running.
    pub fn begin_redo(&mut self) -> Option<UndoRecord> {
        assert_eq!(self.state, UndoState::Idle, "nested redo");
        let entry = self.current_redo_entry()?;
        entry.active = false;
        let record = entry.record.clone();
        self.state = UndoState::Redo;
        Some(record)
    }

    /// Leave the undo/redo state.
    pub fn finish(&mut self) {
        self.state = UndoState::Idle;
    }

    /// Register a record created by an edit.
    ///
    /// While idle the record becomes the newest undo step and every redo
    /// step is dropped. While undoing or redoing it replaces the record
    /// being reversed and moves the redo boundary across it.
    pub fn new_undo(&mut self, record: UndoRecord) {
        tracing::trace!(kind = record.kind(), state = ?self.state, "new undo record");

        if !self.multiple {
            let mut entry = Entry::new(record);
            if self.state != UndoState::Idle {
                entry.active = false;
            }
            self.single = Some(entry);
            return;
        }

        match self.state {
            UndoState::Idle => {
                self.list.truncate(self.first_redo);
                if self.last_save.is_some_and(|save| self.first_redo < save) {
                    self.last_save = None;
                }
                self.list.push(Entry::new(record));
                self.first_redo += 1;
                self.prune();
            }
            UndoState::Undo => {
                assert!(self.first_redo > 0, "undo record missing from history");
                self.first_redo -= 1;
                let mut entry = Entry::new(record);
                entry.active = false;
                self.list[self.first_redo] = entry;
            }
            UndoState::Redo => {
                assert!(
                    self.first_redo < self.list.len(),
                    "redo record missing from history"
                );
                let mut entry = Entry::new(record);
                entry.active = false;
                self.list[self.first_redo] = entry;
                self.first_redo += 1;
            }
        }
    }

    /// Drop the oldest entries beyond the depth limit.
    fn prune(&mut self) {
        while self.list.len() > self.max_depth {
            if self.first_redo == 0 {
                tracing::debug!(
                    len = self.list.len(),
                    max = self.max_depth,
                    "undo history over depth with only redo steps left; clearing"
                );
                self.clear();
                break;
            }
            self.list.remove(0);
            self.first_redo -= 1;
            self.last_save = self.last_save.and_then(|save| save.checked_sub(1));
            tracing::debug!(max = self.max_depth, "pruned oldest undo record");
        }
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.list.clear();
        self.single = None;
        self.first_redo = 0;
        self.last_save = None;
    }

    /// Rewrite fonts stored in every record.
    pub fn set_font_name_and_size(&mut self, name: &str, size: u16) {
        for entry in self.list.iter_mut().chain(self.single.iter_mut()) {
            entry.record.set_font_name_and_size(name, size);
        }
    }

    /// Mark the current position as matching the saved document.
    pub fn set_last_save_location(&mut self) {
        self.last_save = Some(self.first_redo);
    }

    pub fn clear_last_save_location(&mut self) {
        self.last_save = None;
    }

    /// Whether the buffer is back at the saved state.
    ///
    /// Only multiple-undo mode can tell; single-undo mode always reports `false`.
    #[must_use]
    pub fn is_at_last_save_location(&self) -> bool {
        self.multiple && self.last_save == Some(self.first_redo)
    }
}
