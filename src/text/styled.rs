//! Styled text buffer with undo/redo.
//!
//! [`StyledText`] pairs a [`TextStore`] with a [`RunArray`] holding one
//! [`Font`] per character, and routes every edit through the undo history.
//! The text and style stores always have the same length once a public
//! operation returns.
//!
//! # Examples
//!
//! ```
//! use styled_text::{Font, StyledText, TextOptions};
//!
//! let mut text = StyledText::new(TextOptions::default());
//! text.set_text("Hello World", None);
//!
//! let world = text.char_range(6..11);
//! text.set_font_bold(&world, true, false);
//! assert!(text.font_at(6).style.is_bold());
//!
//! let hello = text.char_range(0..5);
//! text.paste(&hello, "Goodbye", None);
//! assert_eq!(text.text(), "Goodbye World");
//!
//! text.undo();
//! assert_eq!(text.text(), "Hello World");
//! text.redo();
//! assert_eq!(text.text(), "Goodbye World");
//! ```

// if-let-else is clearer than map_or for the coalescing checks
#![allow(clippy::option_if_let_else)]

use std::fmt;

use crate::color::Rgb;
use crate::event::{Notifier, RejectReason, TextEvent};
use crate::font::{DefaultFontProvider, Font, FontAttributes, FontProvider, FontStyle};
use crate::options::TextOptions;

use super::clean::{Cleaned, TextFilter, clean_text};
use super::crm::CrmRules;
use super::index::{TextCount, TextIndex, TextRange};
use super::rope::TextStore;
use super::runs::RunArray;
use super::undo::{Replacement, UndoHistory, UndoRecord};

/// Decides which characters belong to words.
pub type WordPredicate = fn(char) -> bool;

/// Alphanumerics, apostrophe and underscore.
#[must_use]
pub fn default_is_char_in_word(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '_'
}

pub(crate) const fn is_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Signed difference `after - before` for change notifications.
pub(crate) fn delta(after: TextCount, before: TextCount) -> (isize, isize) {
    (
        after.chars as isize - before.chars as isize,
        after.bytes as isize - before.bytes as isize,
    )
}

/// Font for text inserted before element `index` of `styles`.
///
/// A line start takes the font of the line; anywhere else the preceding
/// character's font carries on.
pub(super) fn insertion_font(styles: &RunArray<Font>, index: usize, after_newline: bool, default: &Font) -> Font {
    if index > 0 && index < styles.len() && after_newline {
        styles.get(index).clone()
    } else if index > 0 {
        styles.get(index - 1).clone()
    } else {
        styles.first().unwrap_or(default).clone()
    }
}

/// Text with per-character fonts and an undo history.
pub struct StyledText {
    pub(super) text: TextStore,
    pub(super) styles: RunArray<Font>,
    pub(super) default_font: Font,
    pub(super) options: TextOptions,
    pub(super) history: UndoHistory,
    word_predicate: WordPredicate,
    filter: Option<Box<dyn TextFilter>>,
    notifier: Notifier,
    crm_rules: Option<CrmRules>,
    pub(super) font_provider: Box<dyn FontProvider>,
}

impl Default for StyledText {
    fn default() -> Self {
        Self::new(TextOptions::default())
    }
}

impl fmt::Debug for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyledText")
            .field("text", &self.text)
            .field("styles", &self.styles)
            .field("default_font", &self.default_font)
            .field("options", &self.options)
            .field("history", &self.history)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl StyledText {
    /// Create an empty buffer.
    #[must_use]
    pub fn new(options: TextOptions) -> Self {
        Self::with_font_provider(options, DefaultFontProvider)
    }

    /// Create an empty buffer that takes its fonts from `provider`.
    #[must_use]
    pub fn with_font_provider(options: TextOptions, provider: impl FontProvider + 'static) -> Self {
        Self {
            text: TextStore::new(),
            styles: RunArray::new(),
            default_font: provider.default_font(),
            history: UndoHistory::new(options.multiple_undo, options.max_undo_count),
            options,
            word_predicate: default_is_char_in_word,
            filter: None,
            notifier: Notifier::default(),
            crm_rules: None,
            font_provider: Box::new(provider),
        }
    }

    /// Create a buffer holding `text`, styled with the default font.
    #[must_use]
    pub fn with_text(text: &str, options: TextOptions) -> Self {
        let mut buffer = Self::new(options);
        buffer.set_text(text, None);
        buffer
    }

    // ------------------------------------------------------------------
    // Contents
    // ------------------------------------------------------------------

    /// The full text.
    #[must_use]
    pub fn text(&self) -> String {
        self.text.to_string()
    }

    /// The underlying text store.
    #[must_use]
    pub fn store(&self) -> &TextStore {
        &self.text
    }

    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.text.len_bytes()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the text ends with a newline.
    #[must_use]
    pub fn ends_with_newline(&self) -> bool {
        let len = self.len_chars();
        len > 0 && self.text.char_at(len - 1) == Some('\n')
    }

    /// One font per character.
    #[must_use]
    pub fn styles(&self) -> &RunArray<Font> {
        &self.styles
    }

    /// Font of the character at `char_index`.
    #[must_use]
    pub fn font_at(&self, char_index: usize) -> &Font {
        self.styles.get(char_index)
    }

    #[must_use]
    pub const fn default_font(&self) -> &Font {
        &self.default_font
    }

    /// Where the buffer gets fonts it has to build itself.
    #[must_use]
    pub fn font_provider(&self) -> &dyn FontProvider {
        self.font_provider.as_ref()
    }

    /// Change the font used for unstyled text.
    pub fn set_default_font(&mut self, font: Font) {
        if font != self.default_font {
            self.default_font = font;
            self.notifier.emit(&TextEvent::DefaultFontChanged);
        }
    }

    /// Copy of the text in `range`.
    #[must_use]
    pub fn substring(&self, range: &TextRange) -> String {
        self.check_range(range);
        self.text.substring(range)
    }

    /// Replace the whole text, discarding undo history.
    ///
    /// Returns `false` if the text had to be cleaned first. If the text
    /// filter rejects it, the buffer and its history are left as they were.
    pub fn set_text(&mut self, text: &str, styles: Option<&RunArray<Font>>) -> bool {
        let mut text = text.to_string();
        let mut styles = styles.cloned();
        let cleaned = self.clean(&mut text, styles.as_mut());
        if !cleaned.is_ok() {
            return false;
        }

        let styles =
            styles.unwrap_or_else(|| RunArray::filled(self.default_font.clone(), text.chars().count()));
        self.text.replace(&text);
        self.styles = styles;
        self.history.clear();
        self.check_invariants();
        self.notifier.emit(&TextEvent::TextSet);
        cleaned == Cleaned::Unchanged
    }

    /// Remove all text and history.
    pub fn clear(&mut self) {
        self.text.clear();
        self.styles = RunArray::new();
        self.history.clear();
        self.notifier.emit(&TextEvent::TextSet);
    }

    // ------------------------------------------------------------------
    // Indices
    // ------------------------------------------------------------------

    /// Paired index of the character at `char_index`.
    #[must_use]
    pub fn index(&self, char_index: usize) -> TextIndex {
        self.text.index(char_index)
    }

    /// The insertion point after the last character.
    #[must_use]
    pub fn beyond_end(&self) -> TextIndex {
        self.text.end()
    }

    /// Full range for a character range.
    #[must_use]
    pub fn char_range(&self, chars: std::ops::Range<usize>) -> TextRange {
        self.text.range(chars)
    }

    /// Range covering the whole text.
    #[must_use]
    pub fn select_all(&self) -> TextRange {
        TextRange::between(TextIndex::ZERO, self.beyond_end())
    }

    /// Move `index` by `char_delta` characters.
    ///
    /// # Panics
    ///
    /// Panics if the result lies outside the text.
    #[must_use]
    pub fn adjust_text_index(&self, index: TextIndex, char_delta: isize) -> TextIndex {
        let target = index
            .char_index
            .checked_add_signed(char_delta)
            .filter(|&c| c <= self.len_chars());
        match target {
            Some(c) => self.text.index(c),
            None => panic!("adjusting {index:?} by {char_delta} leaves the text"),
        }
    }

    pub(super) fn check_index(&self, index: TextIndex) {
        assert!(
            index.char_index <= self.len_chars(),
            "text index {index:?} out of bounds (len {})",
            self.len_chars()
        );
        assert_eq!(
            self.text.index(index.char_index).byte_index,
            index.byte_index,
            "byte offset out of sync for {index:?}"
        );
    }

    pub(super) fn check_range(&self, range: &TextRange) {
        assert!(range.is_consistent(), "inconsistent text range {range:?}");
        assert!(
            range.chars.end <= self.len_chars(),
            "text range {range:?} out of bounds (len {})",
            self.len_chars()
        );
        assert_eq!(
            self.text.range(range.chars.clone()),
            *range,
            "byte offsets out of sync for {range:?}"
        );
    }

    pub(super) fn check_invariants(&self) {
        assert_eq!(
            self.styles.len(),
            self.text.len_chars(),
            "style runs out of sync with text"
        );
        debug_assert!(self.styles.is_consistent());
        debug_assert!(self.history.first_redo() <= self.history.len());
    }

    // ------------------------------------------------------------------
    // Words, paragraphs, columns
    // ------------------------------------------------------------------

    /// Replace the word-membership test used by word navigation and whole-word search.
    pub fn set_word_predicate(&mut self, predicate: WordPredicate) {
        self.word_predicate = predicate;
    }

    #[must_use]
    pub fn is_char_in_word(&self, c: char) -> bool {
        (self.word_predicate)(c)
    }

    /// Start of the word at or before `index`.
    #[must_use]
    pub fn word_start(&self, index: TextIndex) -> TextIndex {
        if self.is_empty() || index.char_index == 0 {
            return TextIndex::ZERO;
        }
        let mut pos = index.char_index.min(self.len_chars() - 1) + 1;
        let mut chars = self.text.chars_at(pos);
        let mut in_word = false;
        while let Some(c) = chars.prev() {
            let word = self.is_char_in_word(c);
            if in_word && !word {
                break;
            }
            in_word |= word;
            pos -= 1;
        }
        self.text.index(pos)
    }

    /// Last character of the word at or after `index`.
    #[must_use]
    pub fn word_end(&self, index: TextIndex) -> TextIndex {
        let len = self.len_chars();
        if len == 0 {
            return TextIndex::ZERO;
        }
        if index.char_index + 1 >= len {
            return self.text.index(len - 1);
        }
        let mut pos = index.char_index;
        let mut in_word = false;
        for c in self.text.chars_at(pos) {
            let word = self.is_char_in_word(c);
            if in_word && !word {
                break;
            }
            in_word |= word;
            pos += 1;
        }
        self.text.index(pos - 1)
    }

    /// Start of the partial word at or before `index`.
    ///
    /// Partial words split at case humps (`getWord`), at an acronym
    /// followed by a capitalized word (`ABCGood`), between letters and
    /// digits, and at anything that is not alphanumeric.
    #[must_use]
    pub fn partial_word_start(&self, index: TextIndex) -> TextIndex {
        if self.is_empty() || index.char_index == 0 {
            return TextIndex::ZERO;
        }
        let mut pos = index.char_index.min(self.len_chars() - 1) + 1;
        let mut chars = self.text.chars_at(pos);

        let Some(mut prev) = chars.prev() else {
            return TextIndex::ZERO;
        };
        pos -= 1;
        while !prev.is_alphanumeric() {
            let Some(c) = chars.prev() else {
                return TextIndex::ZERO;
            };
            pos -= 1;
            prev = c;
        }

        let mut found_lower = prev.is_lowercase();
        while let Some(c) = chars.prev() {
            found_lower |= c.is_lowercase();
            if !c.is_alphanumeric()
                || (prev.is_uppercase() && c.is_lowercase())
                || (prev.is_uppercase() && c.is_uppercase() && found_lower)
                || letter_digit_boundary(prev, c)
            {
                break;
            }
            pos -= 1;
            prev = c;
        }
        self.text.index(pos)
    }

    /// Last character of the partial word at or after `index`.
    ///
    /// Uses the same boundaries as [`partial_word_start`](Self::partial_word_start).
    #[must_use]
    pub fn partial_word_end(&self, index: TextIndex) -> TextIndex {
        let len = self.len_chars();
        if len == 0 {
            return TextIndex::ZERO;
        }
        if index.char_index + 1 >= len {
            return self.text.index(len - 1);
        }
        let mut pos = index.char_index;
        let mut chars = self.text.chars_at(pos).peekable();

        let mut prev = ' ';
        for c in chars.by_ref() {
            pos += 1;
            prev = c;
            if c.is_alphanumeric() {
                break;
            }
        }

        while let Some(c) = chars.next() {
            let acronym_end =
                prev.is_uppercase() && c.is_uppercase() && chars.peek().is_some_and(|n| n.is_lowercase());
            if !c.is_alphanumeric()
                || (prev.is_lowercase() && c.is_uppercase())
                || letter_digit_boundary(prev, c)
                || acronym_end
            {
                break;
            }
            pos += 1;
            prev = c;
        }
        self.text.index(pos - 1)
    }

    /// First character of the line holding `index`.
    #[must_use]
    pub fn paragraph_start(&self, index: TextIndex) -> TextIndex {
        if self.is_empty() || index.char_index == 0 {
            return TextIndex::ZERO;
        }
        let mut pos = index.char_index.min(self.len_chars());
        let mut chars = self.text.chars_at(pos);
        while let Some(c) = chars.prev() {
            if c == '\n' {
                break;
            }
            pos -= 1;
        }
        self.text.index(pos)
    }

    /// The newline ending the line holding `index`, or the last character.
    #[must_use]
    pub fn paragraph_end(&self, index: TextIndex) -> TextIndex {
        let len = self.len_chars();
        if len == 0 {
            return TextIndex::ZERO;
        }
        if index.char_index + 1 >= len {
            return self.text.index(len - 1);
        }
        let mut pos = index.char_index;
        for c in self.text.chars_at(pos) {
            if c == '\n' {
                break;
            }
            pos += 1;
        }
        self.text.index(pos.min(len - 1))
    }

    /// Zero-based display column of `index` on the line starting at `line_start`.
    #[must_use]
    pub fn column_for_char(&self, line_start: TextIndex, index: TextIndex) -> usize {
        if index.char_index >= self.len_chars() && self.ends_with_newline() {
            return 0;
        }
        let count = index.char_index.saturating_sub(line_start.char_index);
        self.text
            .chars_at(line_start.char_index)
            .take(count)
            .fold(0, |col, c| {
                col + if c == '\t' {
                    self.options.tab_stop_distance(col)
                } else {
                    1
                }
            })
    }

    /// Whether `range` is a whole word: word characters only, bounded by non-word characters.
    #[must_use]
    pub fn is_entire_word(&self, range: &TextRange) -> bool {
        let before = range
            .chars
            .start
            .checked_sub(1)
            .and_then(|i| self.text.char_at(i));
        let after = self.text.char_at(range.chars.end);
        if before.is_some_and(|c| self.is_char_in_word(c))
            || after.is_some_and(|c| self.is_char_in_word(c))
        {
            return false;
        }
        self.text
            .chars_at(range.chars.start)
            .take(range.chars.len())
            .all(|c| self.is_char_in_word(c))
    }

    // ------------------------------------------------------------------
    // Hooks and configuration
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn options(&self) -> &TextOptions {
        &self.options
    }

    pub fn set_tab_width(&mut self, width: usize) {
        assert!(width > 0, "tab width must be positive");
        self.options.tab_width = width;
    }

    pub fn set_tab_inserts_spaces(&mut self, spaces: bool) {
        self.options.tab_inserts_spaces = spaces;
    }

    pub fn set_paste_styled_text(&mut self, styled: bool) {
        self.options.paste_styled_text = styled;
    }

    pub fn set_crm_line_width(&mut self, width: usize) {
        self.options.crm_line_width = width;
    }

    pub fn set_auto_indent(&mut self, auto_indent: bool) {
        self.options.auto_indent = auto_indent;
    }

    /// Install a filter run on all incoming text.
    pub fn set_filter(&mut self, filter: impl TextFilter + 'static) {
        self.filter = Some(Box::new(filter));
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
    }

    /// Install the change listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl FnMut(&TextEvent) + 'static) {
        self.notifier.set(Box::new(listener));
    }

    pub fn clear_listener(&mut self) {
        self.notifier.clear();
    }

    /// Use an owned or shared list of line-prefix rules.
    pub fn set_crm_rule_list(&mut self, rules: impl Into<CrmRules>) {
        self.crm_rules = Some(rules.into());
    }

    /// Drop the rule list (releasing the shared reference, if any).
    pub fn clear_crm_rule_list(&mut self) {
        self.crm_rules = None;
    }

    #[must_use]
    pub fn crm_rule_list(&self) -> Option<&CrmRules> {
        self.crm_rules.as_ref()
    }

    pub(super) fn clean(&mut self, text: &mut String, styles: Option<&mut RunArray<Font>>) -> Cleaned {
        let cleaned = clean_text(text, styles, self.filter.as_deref());
        if !cleaned.is_ok() {
            self.notifier.emit(&TextEvent::InputRejected {
                reason: RejectReason::Filtered,
            });
        }
        cleaned
    }

    pub(crate) fn emit(&mut self, event: &TextEvent) {
        self.notifier.emit(event);
    }

    pub(super) fn notify_change(
        &mut self,
        range: TextRange,
        (char_delta, byte_delta): (isize, isize),
        deletion: bool,
    ) {
        self.check_invariants();
        self.notifier.emit(&TextEvent::TextChanged {
            range,
            char_delta,
            byte_delta,
            deletion,
        });
    }

    // ------------------------------------------------------------------
    // Store primitives (no undo, no notification)
    // ------------------------------------------------------------------

    /// Font for text inserted at `index` without explicit styles.
    #[must_use]
    pub fn calc_insertion_font(&self, index: TextIndex) -> Font {
        let i = index.char_index;
        let after_newline = i > 0 && self.text.char_at(i - 1) == Some('\n');
        insertion_font(&self.styles, i, after_newline, &self.default_font)
    }

    pub(super) fn copy_range(&self, range: &TextRange) -> (String, RunArray<Font>) {
        (
            self.text.substring(range),
            self.styles.slice(range.chars.clone()),
        )
    }

    /// Insert already-cleaned text; styles go in first so they are never short.
    pub(super) fn store_insert(&mut self, at: TextIndex, text: &str, styles: &RunArray<Font>) -> TextCount {
        let count = TextCount::of(text);
        assert_eq!(styles.len(), count.chars, "style count does not match text length");
        self.styles.insert_array(at.char_index, styles);
        self.text.insert(at, text);
        count
    }

    pub(super) fn store_delete(&mut self, range: &TextRange) {
        self.styles.remove_range(range.chars.clone());
        self.text.remove(range);
    }

    /// Replace `range` and return the range of the new content.
    pub(super) fn store_replace(&mut self, range: &TextRange, text: &str, styles: &RunArray<Font>) -> TextRange {
        if !range.is_empty() {
            self.store_delete(range);
        }
        let count = self.store_insert(range.first(), text, styles);
        TextRange::new(range.first(), count)
    }

    // ------------------------------------------------------------------
    // Edit primitives
    // ------------------------------------------------------------------

    /// Copy the text and styles in `range`; `None` for an empty range.
    #[must_use]
    pub fn copy(&self, range: &TextRange) -> Option<(String, RunArray<Font>)> {
        self.check_range(range);
        if range.is_empty() {
            None
        } else {
            Some(self.copy_range(range))
        }
    }

    /// Insert `text` at `index` as typing.
    ///
    /// Without `styles` the text takes `font`, or else the font around the
    /// insertion point. Returns the inserted length, zero if the text was
    /// empty or rejected.
    pub fn insert_text(
        &mut self,
        index: TextIndex,
        text: &str,
        styles: Option<&RunArray<Font>>,
        font: Option<&Font>,
    ) -> TextCount {
        self.check_index(index);
        if text.is_empty() {
            return TextCount::ZERO;
        }

        let mut text = text.to_string();
        let mut styles = styles.cloned();
        if !self.clean(&mut text, styles.as_mut()).is_ok() || text.is_empty() {
            return TextCount::ZERO;
        }
        let styles = styles.unwrap_or_else(|| {
            let font = font.cloned().unwrap_or_else(|| self.calc_insertion_font(index));
            RunArray::filled(font, text.chars().count())
        });

        let count = self.store_insert(index, &text, &styles);
        self.extend_typing_undo(index, |undo| undo.handle_characters(count));
        self.notify_change(TextRange::new(index, count), delta(count, TextCount::ZERO), false);
        count
    }

    /// Delete `range` as a new typing step.
    pub fn delete_text(&mut self, range: &TextRange) {
        self.check_range(range);
        if range.is_empty() {
            return;
        }
        let (text, styles) = self.copy_range(range);
        self.store_delete(range);
        self.history.new_undo(UndoRecord::Typing(Replacement::new(
            TextRange::empty_at(range.first()),
            text,
            styles,
        )));
        self.notify_change(
            TextRange::empty_at(range.first()),
            delta(TextCount::ZERO, range.count()),
            true,
        );
    }

    /// Type one character, replacing `replace` if it is not empty.
    pub fn insert_character(&mut self, replace: &TextRange, c: char, font: Option<&Font>) -> TextCount {
        self.check_range(replace);
        let mut text = c.to_string();
        if !self.clean(&mut text, None).is_ok() || text.is_empty() {
            return TextCount::ZERO;
        }

        let start = replace.first();
        let replaced = if replace.is_empty() {
            None
        } else {
            let old = self.copy_range(replace);
            self.store_delete(replace);
            Some(old)
        };

        let font = font.cloned().unwrap_or_else(|| self.calc_insertion_font(start));
        let count = self.store_insert(start, &text, &RunArray::filled(font, text.chars().count()));

        match replaced {
            Some((old_text, old_styles)) => {
                self.history.new_undo(UndoRecord::Typing(Replacement::new(
                    TextRange::new(start, count),
                    old_text,
                    old_styles,
                )));
            }
            None => self.extend_typing_undo(start, |undo| undo.handle_characters(count)),
        }
        self.notify_change(
            TextRange::new(start, count),
            delta(count, replace.count()),
            !replace.is_empty(),
        );
        count
    }

    /// Backspace at `caret`, returning the new caret.
    ///
    /// With `delete_to_tab_stop`, a caret sitting on a tab stop after
    /// whitespace removes the whole stop instead of one character.
    pub fn backward_delete(
        &mut self,
        line_start: TextIndex,
        caret: TextIndex,
        delete_to_tab_stop: bool,
    ) -> TextIndex {
        self.check_index(caret);
        if caret.char_index == 0 {
            return TextIndex::ZERO;
        }

        let single = caret.char_index - 1;
        let mut start = single;
        let tab_width = self.options.tab_width;
        if delete_to_tab_stop
            && self.text.char_at(single).is_some_and(is_whitespace)
            && self.column_for_char(line_start, caret) % tab_width == 0
        {
            let mut columns = 0;
            let mut pos = caret.char_index;
            while columns < tab_width && pos > 0 {
                match self.text.char_at(pos - 1) {
                    Some(' ') => columns += 1,
                    Some('\t') => {
                        let col = self.column_for_char(line_start, self.text.index(pos - 1));
                        columns += self.options.tab_stop_distance(col);
                    }
                    _ => {
                        pos = single;
                        break;
                    }
                }
                pos -= 1;
            }
            start = pos;
        }

        let range = self.text.range(start..caret.char_index);
        let (text, styles) = self.copy_range(&range);
        self.store_delete(&range);
        self.extend_typing_undo(caret, |undo| undo.handle_delete(&text, &styles));
        self.notify_change(
            TextRange::empty_at(range.first()),
            delta(TextCount::ZERO, range.count()),
            true,
        );
        range.first()
    }

    /// Delete forward from `caret`.
    pub fn forward_delete(&mut self, line_start: TextIndex, caret: TextIndex, delete_to_tab_stop: bool) {
        self.check_index(caret);
        let len = self.len_chars();
        if caret.char_index >= len {
            return;
        }

        let mut end = caret.char_index + 1;
        let tab_width = self.options.tab_width;
        if delete_to_tab_stop
            && self.text.char_at(caret.char_index).is_some_and(is_whitespace)
            && self.column_for_char(line_start, caret) % tab_width == 0
        {
            let mut pos = caret.char_index;
            let mut columns = 0;
            while columns < tab_width && pos < len {
                let c = self.text.char_at(pos);
                pos += 1;
                match c {
                    Some('\t') => break,
                    Some(' ') => columns += 1,
                    _ => {
                        pos = caret.char_index + 1;
                        break;
                    }
                }
            }
            end = pos;
        }

        let range = self.text.range(caret.char_index..end);
        let (text, styles) = self.copy_range(&range);
        self.store_delete(&range);
        self.extend_typing_undo(caret, |undo| undo.handle_forward_delete(&text, &styles));
        self.notify_change(
            TextRange::empty_at(caret),
            delta(TextCount::ZERO, range.count()),
            true,
        );
    }

    /// Replace `range` with `text` as one paste step and return the new range.
    ///
    /// `styles` are used only when pasting styled text is enabled; otherwise
    /// the text takes the font around the insertion point, or the default
    /// font in plain-text mode. Rejected text leaves the buffer unchanged and
    /// returns an empty range at `range`'s start.
    pub fn paste(&mut self, range: &TextRange, text: &str, styles: Option<&RunArray<Font>>) -> TextRange {
        self.check_range(range);
        if range.is_empty() && text.is_empty() {
            return range.clone();
        }
        let styles = styles.filter(|_| self.options.paste_styled_text);
        self.paste_with(range, text, styles)
    }

    /// Paste that always keeps `styles` when given.
    pub(super) fn paste_with(&mut self, range: &TextRange, text: &str, styles: Option<&RunArray<Font>>) -> TextRange {
        let mut text = text.to_string();
        let mut styles = styles.cloned();
        if !self.clean(&mut text, styles.as_mut()).is_ok() {
            return TextRange::empty_at(range.first());
        }

        let (old_text, old_styles) = self.copy_range(range);
        if !range.is_empty() {
            self.store_delete(range);
        }

        let styles = styles.unwrap_or_else(|| {
            let font = if self.options.paste_styled_text {
                self.calc_insertion_font(range.first())
            } else {
                self.default_font.clone()
            };
            RunArray::filled(font, text.chars().count())
        });
        let count = self.store_insert(range.first(), &text, &styles);
        let new_range = TextRange::new(range.first(), count);

        self.history.new_undo(UndoRecord::Paste(Replacement::new(
            new_range.clone(),
            old_text,
            old_styles,
        )));
        self.notify_change(new_range.clone(), delta(count, range.count()), !range.is_empty());
        new_range
    }

    /// Move (or copy) `src` so it starts at `dest`, as measured before the move.
    ///
    /// Returns `false` if nothing happened: an empty source, or a move whose
    /// destination lies inside the source.
    pub fn move_text(&mut self, src: &TextRange, dest: TextIndex, copy: bool) -> bool {
        self.check_range(src);
        self.check_index(dest);
        if src.is_empty()
            || (!copy && src.chars.start <= dest.char_index && dest.char_index <= src.chars.end)
        {
            return false;
        }

        let (text, styles) = self.copy_range(src);
        let count = src.count();

        if copy {
            self.store_insert(dest, &text, &styles);
            let range = TextRange::new(dest, count);
            self.history.new_undo(UndoRecord::Paste(Replacement::new(
                range.clone(),
                String::new(),
                RunArray::new(),
            )));
            self.notify_change(range, delta(count, TextCount::ZERO), false);
            return true;
        }

        let mut dest = dest;
        let mut src_index = src.first();
        if dest > src_index {
            dest = dest - count;
        } else {
            src_index = src_index + count;
        }

        self.store_delete(src);
        self.store_insert(dest, &text, &styles);
        self.history.new_undo(UndoRecord::Move {
            src: src_index,
            dest,
            count,
        });
        self.notify_change(TextRange::new(dest, count), (0, 0), true);
        true
    }

    /// Extend the active typing record ending at `caret`, or start a new one.
    fn extend_typing_undo(&mut self, caret: TextIndex, f: impl FnOnce(&mut Replacement)) {
        if let Some(UndoRecord::Typing(undo)) = self.history.active_undo_mut() {
            if undo.matches_current_index(caret) {
                tracing::trace!(caret = caret.char_index, "coalescing typing");
                f(undo);
                return;
            }
        }
        let mut undo = Replacement::at(caret);
        f(&mut undo);
        self.history.new_undo(UndoRecord::Typing(undo));
    }

    // ------------------------------------------------------------------
    // Fonts
    // ------------------------------------------------------------------

    /// Rewrite the fonts in `range`; returns whether anything changed.
    ///
    /// The change is recorded as a style step (consecutive changes to the
    /// same range share one step) unless `clear_undo` is set, in which case
    /// all history is dropped instead.
    pub fn map_fonts(&mut self, range: &TextRange, clear_undo: bool, f: impl FnMut(&Font) -> Font) -> bool {
        self.check_range(range);
        if range.is_empty() {
            return false;
        }
        let before = self.styles.slice(range.chars.clone());
        if !self.styles.map_range(range.chars.clone(), f) {
            return false;
        }

        if clear_undo {
            self.history.clear();
        } else {
            self.record_style_undo(range, before);
        }
        self.notify_change(range.clone(), (0, 0), false);
        true
    }

    fn record_style_undo(&mut self, range: &TextRange, before: RunArray<Font>) {
        if let Some(UndoRecord::Style { range: current, .. }) = self.history.active_undo_mut() {
            if *current == *range {
                return;
            }
        }
        self.history.new_undo(UndoRecord::Style {
            range: range.clone(),
            styles: before,
        });
    }

    pub fn set_font_name(&mut self, range: &TextRange, name: &str, clear_undo: bool) -> bool {
        self.map_fonts(range, clear_undo, |font| font.clone().with_name(name))
    }

    pub fn set_font_size(&mut self, range: &TextRange, size: u16, clear_undo: bool) -> bool {
        self.map_fonts(range, clear_undo, |font| font.clone().with_size(size))
    }

    pub fn set_font_bold(&mut self, range: &TextRange, bold: bool, clear_undo: bool) -> bool {
        self.set_font_attribute(range, FontAttributes::BOLD, bold, clear_undo)
    }

    pub fn set_font_italic(&mut self, range: &TextRange, italic: bool, clear_undo: bool) -> bool {
        self.set_font_attribute(range, FontAttributes::ITALIC, italic, clear_undo)
    }

    pub fn set_font_strike(&mut self, range: &TextRange, strike: bool, clear_undo: bool) -> bool {
        self.set_font_attribute(range, FontAttributes::STRIKE, strike, clear_undo)
    }

    fn set_font_attribute(&mut self, range: &TextRange, flag: FontAttributes, on: bool, clear_undo: bool) -> bool {
        self.map_fonts(range, clear_undo, |font| {
            let mut style = font.style;
            style.attributes.set(flag, on);
            font.clone().with_style(style)
        })
    }

    pub fn set_font_underline(&mut self, range: &TextRange, count: u8, clear_undo: bool) -> bool {
        self.map_fonts(range, clear_undo, |font| {
            font.clone().with_style(font.style.with_underline(count))
        })
    }

    pub fn set_font_color(&mut self, range: &TextRange, color: Rgb, clear_undo: bool) -> bool {
        self.map_fonts(range, clear_undo, |font| font.clone().with_style(font.style.with_color(color)))
    }

    /// Replace bold/italic/strike/underline/color, keeping name and size.
    pub fn set_font_style(&mut self, range: &TextRange, style: FontStyle, clear_undo: bool) -> bool {
        self.map_fonts(range, clear_undo, |font| font.clone().with_style(style))
    }

    /// Give every character in `range` the same font.
    pub fn set_font(&mut self, range: &TextRange, font: &Font, clear_undo: bool) -> bool {
        self.map_fonts(range, clear_undo, |_| font.clone())
    }

    /// Restore per-character fonts over `range` (e.g. from [`copy`](Self::copy)).
    pub fn set_fonts(&mut self, range: &TextRange, fonts: &RunArray<Font>, clear_undo: bool) -> bool {
        assert_eq!(fonts.len(), range.chars.len(), "style count does not match range");
        self.check_range(range);
        if range.is_empty() || self.styles.slice(range.chars.clone()) == *fonts {
            return false;
        }
        let before = self.styles.slice(range.chars.clone());
        self.styles.replace_range(range.chars.clone(), fonts);
        if clear_undo {
            self.history.clear();
        } else {
            self.record_style_undo(range, before);
        }
        self.notify_change(range.clone(), (0, 0), false);
        true
    }

    /// Change the family and size of every font: text, default and undo history.
    pub fn set_all_font_name_and_size(&mut self, name: &str, size: u16) {
        let len = self.len_chars();
        self.styles
            .map_range(0..len, |font| font.clone().with_name(name).with_size(size));
        self.history.set_font_name_and_size(name, size);
        self.default_font = self.default_font.clone().with_name(name).with_size(size);
        self.notify_change(self.select_all(), (0, 0), false);
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Reverse the last step. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(record) = self.history.begin_undo() else {
            return false;
        };
        self.apply_inverse(record);
        self.history.finish();
        true
    }

    /// Replay the last undone step. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.history.begin_redo() else {
            return false;
        };
        self.apply_inverse(record);
        self.history.finish();
        true
    }

    /// Perform the edit that reverses `record`; the edit registers its own inverse.
    fn apply_inverse(&mut self, record: UndoRecord) {
        tracing::debug!(kind = record.kind(), state = ?self.history.state(), "reversing");
        match record {
            UndoRecord::Typing(undo) | UndoRecord::Paste(undo) | UndoRecord::TabShift(undo) => {
                let (current_text, current_styles) = self.copy_range(&undo.range);
                let new_range = self.store_replace(&undo.range, &undo.text, &undo.styles);
                self.history.new_undo(UndoRecord::Paste(Replacement::new(
                    new_range.clone(),
                    current_text,
                    current_styles,
                )));
                self.notify_change(
                    new_range.clone(),
                    delta(new_range.count(), undo.range.count()),
                    !undo.range.is_empty(),
                );
            }
            UndoRecord::Style { range, styles } => {
                let current = self.styles.slice(range.chars.clone());
                self.styles.replace_range(range.chars.clone(), &styles);
                self.history.new_undo(UndoRecord::Style {
                    range: range.clone(),
                    styles: current,
                });
                self.notify_change(range, (0, 0), false);
            }
            UndoRecord::Move { src, dest, count } => {
                let moved = self.move_text(&TextRange::new(dest, count), src, false);
                debug_assert!(moved, "move record could not be reversed");
            }
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drop all undo history.
    pub fn clear_undo(&mut self) {
        self.history.clear();
    }

    /// Stop the newest step from absorbing further edits.
    pub fn deactivate_current_undo(&mut self) {
        self.history.deactivate_current();
    }

    #[must_use]
    pub const fn is_using_multiple_undo(&self) -> bool {
        self.history.is_multiple()
    }

    /// Switch undo mode; existing history is discarded.
    pub fn use_multiple_undo(&mut self, multiple: bool) {
        self.options.multiple_undo = multiple;
        self.history.set_multiple(multiple);
    }

    #[must_use]
    pub const fn undo_depth(&self) -> usize {
        self.history.max_depth()
    }

    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn set_undo_depth(&mut self, depth: usize) {
        self.options.max_undo_count = depth;
        self.history.set_max_depth(depth);
    }

    pub fn set_last_save_location(&mut self) {
        self.history.set_last_save_location();
    }

    pub fn clear_last_save_location(&mut self) {
        self.history.clear_last_save_location();
    }

    /// Whether undo/redo has returned the text to its last saved state.
    #[must_use]
    pub fn is_at_last_save_location(&self) -> bool {
        self.history.is_at_last_save_location()
    }
}

fn letter_digit_boundary(a: char, b: char) -> bool {
    (a.is_alphabetic() && b.is_numeric()) || (a.is_numeric() && b.is_alphabetic())
}
