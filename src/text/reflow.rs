//! Line-oriented whitespace edits: indent, outdent and indentation cleanup.
//!
//! Each operation works on the whole lines touched by the requested range.
//! The region is rebuilt line by line in a scratch copy and written back in
//! one replacement, so a multi-line shift is a single undo step.

use crate::font::Font;

use super::index::{TextIndex, TextRange};
use super::runs::RunArray;
use super::styled::{StyledText, delta, is_whitespace};
use super::undo::{Replacement, UndoRecord};

/// Change to the start (and possibly the end) of one line.
///
/// Leading whitespace is ASCII, so `remove` counts both chars and bytes.
struct LineEdit {
    remove: usize,
    insert: String,
    trim_end: bool,
}

impl LineEdit {
    fn insert(prefix: String) -> Self {
        Self {
            remove: 0,
            insert: prefix,
            trim_end: false,
        }
    }

    const fn remove(count: usize) -> Self {
        Self {
            remove: count,
            insert: String::new(),
            trim_end: false,
        }
    }
}

/// Leading characters covering `stops` tab stops, and whether the line had them all.
///
/// Up to `width` spaces followed by a tab count as one stop. A line holding
/// nothing but whitespace always has enough.
fn leading_stops(line: &str, width: usize, stops: usize) -> (usize, bool) {
    let bytes = line.as_bytes();
    let mut taken = 0;
    for _ in 0..stops {
        let spaces = bytes[taken..]
            .iter()
            .take(width)
            .take_while(|&&b| b == b' ')
            .count();
        taken += spaces;
        if spaces == width {
            continue;
        }
        match bytes.get(taken) {
            Some(b'\t') => taken += 1,
            None => return (taken, true),
            Some(_) => return (taken, false),
        }
    }
    (taken, true)
}

fn leading_spaces(line: &str, width: usize) -> usize {
    line.bytes().take(width).take_while(|&b| b == b' ').count()
}

/// Canonical form of an indentation string.
///
/// With `align`, a partial stop rounds to whichever neighbouring stop is closer.
fn normalize_indent(leading: &str, width: usize, spaces: bool, align: bool) -> String {
    let mut stops = 0;
    let mut pending = 0;
    for c in leading.chars() {
        if c == '\t' {
            stops += 1;
            pending = 0;
        } else {
            pending += 1;
            if pending == width {
                stops += 1;
                pending = 0;
            }
        }
    }
    if align && pending > 0 {
        if pending > width / 2 {
            stops += 1;
        }
        pending = 0;
    }

    if spaces {
        " ".repeat(stops * width + pending)
    } else {
        let mut indent = "\t".repeat(stops);
        indent.push_str(&" ".repeat(pending));
        indent
    }
}

impl StyledText {
    /// The whole lines touched by `range`, including the newline ending the last one.
    #[must_use]
    pub fn line_region(&self, range: &TextRange) -> TextRange {
        self.check_range(range);
        if self.is_empty() {
            return TextRange::empty_at(TextIndex::ZERO);
        }
        let start = self.paragraph_start(range.first());
        let last = if range.is_empty() {
            range.first()
        } else {
            self.index(range.chars.end - 1)
        };
        let end = self.paragraph_end(last).char_index + 1;
        TextRange::between(start, self.index(end))
    }

    /// Rebuild `region` by applying `edit` to each line (without its newline).
    ///
    /// Inserted text takes the font of the line's first character. Returns
    /// `None` if the text came out the same.
    fn reshape_lines(
        &self,
        region: &TextRange,
        mut edit: impl FnMut(&str) -> Option<LineEdit>,
    ) -> Option<(String, RunArray<Font>)> {
        let (text, styles) = self.copy_range(region);
        let mut out = String::with_capacity(text.len());
        let mut out_styles = RunArray::new();

        let mut line_start = 0;
        for line in text.split_inclusive('\n') {
            let body = line.strip_suffix('\n').unwrap_or(line);
            let body_chars = body.chars().count();
            let line_chars = body_chars + usize::from(body.len() < line.len());

            match edit(body) {
                Some(e) => {
                    if !e.insert.is_empty() {
                        out.push_str(&e.insert);
                        out_styles.push(styles.get(line_start).clone(), e.insert.chars().count());
                    }
                    let kept_end = if e.trim_end {
                        body.trim_end_matches(is_whitespace).len().max(e.remove)
                    } else {
                        body.len()
                    };
                    let kept_chars = body[..kept_end].chars().count();
                    out.push_str(&body[e.remove..kept_end]);
                    out_styles.append(&styles.slice(line_start + e.remove..line_start + kept_chars));
                    if line_chars > body_chars {
                        out.push('\n');
                        out_styles.append(&styles.slice(line_start + body_chars..line_start + line_chars));
                    }
                }
                None => {
                    out.push_str(line);
                    out_styles.append(&styles.slice(line_start..line_start + line_chars));
                }
            }
            line_start += line_chars;
        }

        (out != text).then_some((out, out_styles))
    }

    /// Write a reshaped region back as one tab-shift step.
    ///
    /// A second shift of the region left by the active tab-shift record
    /// extends that record.
    fn apply_tab_shift(
        &mut self,
        region: &TextRange,
        text: &str,
        styles: &RunArray<Font>,
        deletion: bool,
    ) -> TextRange {
        let (old_text, old_styles) = self.copy_range(region);
        let new_range = self.store_replace(region, text, styles);

        let mut extended = false;
        if let Some(UndoRecord::TabShift(undo)) = self.history.active_undo_mut() {
            if undo.range == *region {
                tracing::trace!(start = region.chars.start, "extending tab shift");
                undo.range = new_range.clone();
                extended = true;
            }
        }
        if !extended {
            self.history.new_undo(UndoRecord::TabShift(Replacement::new(
                new_range.clone(),
                old_text,
                old_styles,
            )));
        }

        self.notify_change(new_range.clone(), delta(new_range.count(), region.count()), deletion);
        new_range
    }

    /// Shift every non-empty line touched by `range` right by `tab_count` stops.
    ///
    /// Returns the range of the shifted lines, or an empty range if no line
    /// could be indented.
    pub fn indent(&mut self, range: &TextRange, tab_count: usize) -> TextRange {
        let region = self.line_region(range);
        let unit = if self.options.tab_inserts_spaces {
            " ".repeat(self.options.tab_width)
        } else {
            "\t".to_string()
        };
        let prefix = unit.repeat(tab_count);
        if prefix.is_empty() {
            return TextRange::empty_at(region.first());
        }

        let edited = self.reshape_lines(&region, |line| {
            (!line.is_empty()).then(|| LineEdit::insert(prefix.clone()))
        });
        match edited {
            Some((text, styles)) => self.apply_tab_shift(&region, &text, &styles, false),
            None => TextRange::empty_at(region.first()),
        }
    }

    /// Shift every line touched by `range` left by `tab_count` stops.
    ///
    /// Every non-empty line must start with enough whitespace. If one does
    /// not, a one-stop outdent of several lines that all begin with some
    /// spaces removes that common run of spaces instead; otherwise nothing
    /// changes and an empty range comes back. `force` strips whatever
    /// indentation each line has, up to `tab_count` stops.
    pub fn outdent(&mut self, range: &TextRange, tab_count: usize, force: bool) -> TextRange {
        let region = self.line_region(range);
        let width = self.options.tab_width;
        let text = self.text.substring(&region);

        let mut sufficient = true;
        let mut common = usize::MAX;
        let mut lines = 0;
        for line in text.split('\n').filter(|line| !line.is_empty()) {
            lines += 1;
            sufficient &= leading_stops(line, width, tab_count).1;
            common = common.min(leading_spaces(line, width));
        }

        let common = if sufficient || force {
            None
        } else if tab_count == 1 && lines > 1 && common > 0 {
            Some(common)
        } else {
            tracing::debug!(tab_count, "not enough leading whitespace to outdent");
            return TextRange::empty_at(region.first());
        };

        let edited = self.reshape_lines(&region, |line| {
            let remove = common.unwrap_or_else(|| leading_stops(line, width, tab_count).0);
            (remove > 0 && !line.is_empty()).then_some(LineEdit::remove(remove))
        });
        match edited {
            Some((text, styles)) => self.apply_tab_shift(&region, &text, &styles, true),
            None => TextRange::empty_at(region.first()),
        }
    }

    /// Strip trailing whitespace from the lines touched by `range` and
    /// rewrite their indentation as tabs or spaces, following
    /// [`TextOptions::tab_inserts_spaces`](crate::TextOptions::tab_inserts_spaces).
    ///
    /// With `align`, partial indentation snaps to the nearest tab stop.
    /// Returns the range of the cleaned lines.
    pub fn clean_whitespace(&mut self, range: &TextRange, align: bool) -> TextRange {
        let region = self.line_region(range);
        let width = self.options.tab_width;
        let spaces = self.options.tab_inserts_spaces;

        let edited = self.reshape_lines(&region, |line| {
            let leading = line.len() - line.trim_start_matches(is_whitespace).len();
            if leading == line.len() {
                return (!line.is_empty()).then_some(LineEdit {
                    remove: leading,
                    insert: String::new(),
                    trim_end: true,
                });
            }
            Some(LineEdit {
                remove: leading,
                insert: normalize_indent(&line[..leading], width, spaces, align),
                trim_end: true,
            })
        });
        match edited {
            Some((text, styles)) => self.paste_with(&region, &text, Some(&styles)),
            None => region,
        }
    }
}
