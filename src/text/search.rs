//! Regex search and replace, and search by font.
//!
//! Searches run over a snapshot of the text, so the buffer can be edited
//! between calls. A search that reaches the end of the text can wrap around
//! and keep going from the other end until it gets back to its start.

use std::ops::Range;

use regex::{Captures, Regex};

use crate::font::Font;

use super::index::{TextIndex, TextRange};
use super::runs::RunArray;
use super::styled::{StyledText, insertion_font};

/// A regex match found in the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMatch {
    pub range: TextRange,
    /// The search wrapped past the end (or start) of the text to find it.
    pub wrapped: bool,
}

/// A run of text whose font satisfied a predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontMatch {
    pub range: TextRange,
    pub wrapped: bool,
}

/// Progress reporting and cancellation for bulk operations.
pub trait ProgressSink {
    /// Called after each replacement; return `false` to stop early.
    fn keep_going(&mut self, processed: usize) -> bool;
}

/// Progress sink that never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn keep_going(&mut self, _processed: usize) -> bool {
        true
    }
}

impl<F: FnMut(usize) -> bool> ProgressSink for F {
    fn keep_going(&mut self, processed: usize) -> bool {
        self(processed)
    }
}

/// Byte offset just past the character starting at `i`.
fn next_boundary(text: &str, i: usize) -> usize {
    i + text[i..].chars().next().map_or(1, char::len_utf8)
}

/// Adjust the case of `dest` to follow `source`.
///
/// Equal lengths copy the case character by character. Otherwise a
/// single-case `source` forces that case onto all of `dest`, and the first
/// character follows the first character of `source`.
#[must_use]
pub fn match_case(source: &str, dest: &str) -> String {
    if source.is_empty() || dest.is_empty() {
        return dest.to_string();
    }

    let source_len = source.chars().count();
    let dest_len = dest.chars().count();
    let mut coerced = None;
    if dest_len > 1 && source_len != dest_len {
        let has_lower = source.chars().any(char::is_lowercase);
        let has_upper = source.chars().any(char::is_uppercase);
        if has_lower && !has_upper {
            coerced = Some(dest.to_lowercase());
        } else if has_upper && !has_lower {
            coerced = Some(dest.to_uppercase());
        }
    }
    let dest = coerced.as_deref().unwrap_or(dest);

    let matched = if source_len == dest_len { source_len } else { 1 };
    let mut out = String::with_capacity(dest.len());
    let mut src = source.chars();
    for (i, c) in dest.chars().enumerate() {
        match src.next().filter(|_| i < matched) {
            Some(s) if s.is_lowercase() && c.is_uppercase() => out.extend(c.to_lowercase()),
            Some(s) if s.is_uppercase() && c.is_lowercase() => out.extend(c.to_uppercase()),
            _ => out.push(c),
        }
    }
    out
}

impl StyledText {
    /// Find the first match at or after `start`.
    ///
    /// With `wrap`, a search that fails before the end starts over from the
    /// beginning and accepts matches that start before `start`.
    #[must_use]
    pub fn search_forward(
        &self,
        start: TextIndex,
        regex: &Regex,
        entire_word: bool,
        wrap: bool,
    ) -> Option<TextMatch> {
        self.check_index(start);
        let text = self.text.to_string();

        if let Some(range) = self.next_match(&text, regex, entire_word, start.byte_index, text.len() + 1) {
            return Some(TextMatch {
                range,
                wrapped: false,
            });
        }
        if wrap && start.byte_index > 0 {
            return self
                .next_match(&text, regex, entire_word, 0, start.byte_index)
                .map(|range| TextMatch {
                    range,
                    wrapped: true,
                });
        }
        None
    }

    /// Find the last match that ends at or before `start`.
    ///
    /// With `wrap`, a search that fails before the beginning starts over from
    /// the end and accepts matches that start after `start`.
    #[must_use]
    pub fn search_backward(
        &self,
        start: TextIndex,
        regex: &Regex,
        entire_word: bool,
        wrap: bool,
    ) -> Option<TextMatch> {
        self.check_index(start);
        let text = self.text.to_string();

        if start.byte_index > 0 {
            if let Some(range) = self.last_match(&text, regex, entire_word, 0, start.byte_index) {
                return Some(TextMatch {
                    range,
                    wrapped: false,
                });
            }
        }
        if wrap && start.byte_index < text.len() {
            return self
                .last_match(&text, regex, entire_word, start.byte_index, text.len())
                .map(|range| TextMatch {
                    range,
                    wrapped: true,
                });
        }
        None
    }

    /// First acceptable match starting in `from..before`.
    fn next_match(
        &self,
        text: &str,
        regex: &Regex,
        entire_word: bool,
        from: usize,
        before: usize,
    ) -> Option<TextRange> {
        let mut pos = from;
        while pos <= text.len() {
            let m = regex.find_at(text, pos)?;
            if m.start() >= before {
                return None;
            }
            if !m.is_empty() && (!entire_word || self.is_entire_word_in(text, m.range())) {
                return Some(self.byte_range(m.range()));
            }
            pos = next_boundary(text, m.start());
        }
        None
    }

    /// Last acceptable match starting at or after `from` and ending by `limit`.
    ///
    /// Every match start is visited once, so this is linear in the text
    /// before `limit` plus the cost of the matches themselves.
    fn last_match(
        &self,
        text: &str,
        regex: &Regex,
        entire_word: bool,
        from: usize,
        limit: usize,
    ) -> Option<TextRange> {
        let mut best = None;
        let mut pos = from;
        while pos <= text.len() {
            let Some(m) = regex.find_at(text, pos) else {
                break;
            };
            if m.start() >= limit {
                break;
            }
            if !m.is_empty()
                && m.end() <= limit
                && (!entire_word || self.is_entire_word_in(text, m.range()))
            {
                best = Some(m.range());
            }
            pos = next_boundary(text, m.start());
        }
        best.map(|bytes| self.byte_range(bytes))
    }

    fn byte_range(&self, bytes: Range<usize>) -> TextRange {
        let rope = self.text.inner();
        TextRange::between(
            TextIndex::new(rope.byte_to_char(bytes.start), bytes.start),
            TextIndex::new(rope.byte_to_char(bytes.end), bytes.end),
        )
    }

    /// [`is_entire_word`](Self::is_entire_word) over a detached copy of text.
    fn is_entire_word_in(&self, text: &str, bytes: Range<usize>) -> bool {
        let before = text[..bytes.start].chars().next_back();
        let after = text[bytes.end..].chars().next();
        !before.is_some_and(|c| self.is_char_in_word(c))
            && !after.is_some_and(|c| self.is_char_in_word(c))
            && text[bytes].chars().all(|c| self.is_char_in_word(c))
    }

    fn prepare_replacement(
        caps: Option<&Captures<'_>>,
        matched: &str,
        replacement: &str,
        interpolate: bool,
        preserve_case: bool,
    ) -> String {
        let mut out = String::new();
        match caps {
            Some(caps) if interpolate => caps.expand(replacement, &mut out),
            _ => out.push_str(replacement),
        }
        if preserve_case {
            out = match_case(matched, &out);
        }
        out
    }

    /// Replace a match found by a search, returning the range of the new text.
    ///
    /// With `interpolate`, `$1`/`${name}` in `replacement` expand to the
    /// match's groups. With `preserve_case`, the result copies the case
    /// pattern of the matched text.
    pub fn replace_match(
        &mut self,
        found: &TextMatch,
        regex: &Regex,
        replacement: &str,
        interpolate: bool,
        preserve_case: bool,
    ) -> TextRange {
        self.check_range(&found.range);
        let text = self.text.to_string();
        let matched = &text[found.range.bytes.clone()];
        let caps = regex
            .captures_at(&text, found.range.bytes.start)
            .filter(|caps| caps.get(0).is_some_and(|m| m.range() == found.range.bytes));

        let replaced =
            Self::prepare_replacement(caps.as_ref(), matched, replacement, interpolate, preserve_case);
        let font = if self.options.paste_styled_text {
            self.calc_insertion_font(found.range.first())
        } else {
            self.default_font.clone()
        };
        let styles = RunArray::filled(font, replaced.chars().count());
        self.paste_with(&found.range, &replaced, Some(&styles))
    }

    /// Replace every match inside `range` as a single paste step.
    ///
    /// Matches are found left to right and scanning resumes after each
    /// replacement. If `progress` asks to stop, the replacements made so far
    /// are kept. Returns the range of the rewritten text, or an empty range
    /// at `range`'s start if nothing matched.
    #[allow(clippy::too_many_arguments)]
    pub fn replace_all_in_range(
        &mut self,
        range: &TextRange,
        regex: &Regex,
        entire_word: bool,
        replacement: &str,
        interpolate: bool,
        preserve_case: bool,
        progress: &mut dyn ProgressSink,
    ) -> TextRange {
        self.check_range(range);
        let (mut text, mut styles) = self.copy_range(range);

        let mut processed = 0;
        let mut pos = 0;
        // char offset of byte `cursor.0`, so positions are never recounted from the start
        let mut cursor = (0, 0);
        while pos <= text.len() {
            let Some(caps) = regex.captures_at(&text, pos) else {
                break;
            };
            let Some(m) = caps.get(0) else {
                break;
            };
            if m.is_empty() || (entire_word && !self.is_entire_word_in(&text, m.range())) {
                pos = next_boundary(&text, m.start());
                continue;
            }

            let replaced = Self::prepare_replacement(
                Some(&caps),
                m.as_str(),
                replacement,
                interpolate,
                preserve_case,
            );
            let bytes = m.range();
            let start = cursor.1 + text[cursor.0..bytes.start].chars().count();
            let matched_chars = m.as_str().chars().count();
            let font = self.replacement_font(&styles, &text, start, bytes.start);
            drop(caps);

            let replaced_chars = replaced.chars().count();
            styles.remove_range(start..start + matched_chars);
            styles.insert(start, font, replaced_chars);
            text.replace_range(bytes.clone(), &replaced);

            pos = bytes.start + replaced.len();
            cursor = (pos, start + replaced_chars);
            processed += 1;
            if !progress.keep_going(processed) {
                tracing::debug!(processed, "replace all cancelled");
                break;
            }
        }

        if processed == 0 {
            return TextRange::empty_at(range.first());
        }
        self.paste_with(range, &text, Some(&styles))
    }

    fn replacement_font(&self, styles: &RunArray<Font>, text: &str, index: usize, byte: usize) -> Font {
        if !self.options.paste_styled_text {
            return self.default_font.clone();
        }
        let after_newline = text[..byte].ends_with('\n');
        insertion_font(styles, index, after_newline, self.default_font())
    }

    /// Find the next run at or after `start` whose font satisfies `pred`.
    ///
    /// A run that `start` falls inside of is skipped.
    #[must_use]
    pub fn search_forward_font(
        &self,
        start: TextIndex,
        pred: impl Fn(&Font) -> bool,
        wrap: bool,
    ) -> Option<FontMatch> {
        self.check_index(start);
        let styles = &self.styles;
        let run_count = styles.run_count();
        let s = start.char_index;

        let mut first = if s >= styles.len() {
            run_count
        } else {
            let (run, run_start) = styles.find_run(s);
            if run_start < s { run + 1 } else { run }
        };
        let mut wrapped = false;
        if first >= run_count {
            if !wrap {
                return None;
            }
            first = 0;
            wrapped = true;
        }

        let found = |run: usize, wrapped: bool| FontMatch {
            range: self.text.range(styles.run_range(run)),
            wrapped,
        };
        if let Some(run) = (first..run_count).find(|&r| pred(&styles.runs()[r].value)) {
            return Some(found(run, wrapped));
        }
        if !wrap || wrapped {
            return None;
        }
        (0..run_count)
            .take_while(|&r| styles.run_range(r).start < s)
            .find(|&r| pred(&styles.runs()[r].value))
            .map(|run| found(run, true))
    }

    /// Find the closest run before `start` whose font satisfies `pred`.
    #[must_use]
    pub fn search_backward_font(
        &self,
        start: TextIndex,
        pred: impl Fn(&Font) -> bool,
        wrap: bool,
    ) -> Option<FontMatch> {
        self.check_index(start);
        let styles = &self.styles;
        let run_count = styles.run_count();
        let s = start.char_index;

        let mut end = if s >= styles.len() {
            run_count
        } else {
            styles.find_run(s).0
        };
        let mut wrapped = false;
        if end == 0 {
            if !wrap {
                return None;
            }
            end = run_count;
            wrapped = true;
        }

        let found = |run: usize, wrapped: bool| FontMatch {
            range: self.text.range(styles.run_range(run)),
            wrapped,
        };
        if let Some(run) = (0..end).rev().find(|&r| pred(&styles.runs()[r].value)) {
            return Some(found(run, wrapped));
        }
        if !wrap || wrapped {
            return None;
        }
        (0..run_count)
            .rev()
            .take_while(|&r| styles.run_range(r).end > s)
            .find(|&r| pred(&styles.runs()[r].value))
            .map(|run| found(run, true))
    }
}
