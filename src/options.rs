//! Buffer configuration.
//!
//! # Examples
//!
//! ```
//! use styled_text::{StyledText, TextOptions};
//!
//! let options = TextOptions::default()
//!     .with_max_undo_count(20)
//!     .with_tab_width(4)
//!     .with_tab_inserts_spaces(true);
//! let text = StyledText::new(options);
//! assert_eq!(text.options().tab_width, 4);
//! ```

use crate::text::DEFAULT_MAX_UNDO_COUNT;

/// Default tab stop spacing, as used by most UNIX tools.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Default right margin for paragraph reflow rules.
pub const DEFAULT_CRM_LINE_WIDTH: usize = 75;

/// Settings for a [`StyledText`](crate::StyledText).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextOptions {
    /// Keep a list of undo steps instead of a single slot.
    pub multiple_undo: bool,
    /// Maximum number of undo steps kept in multiple-undo mode.
    pub max_undo_count: usize,
    /// Keep style information of pasted text; otherwise pastes use the default font.
    pub paste_styled_text: bool,
    /// Indent with spaces instead of tab characters.
    pub tab_inserts_spaces: bool,
    /// Columns per tab stop.
    pub tab_width: usize,
    /// Right margin used by reflow rules.
    pub crm_line_width: usize,
    /// Carry the previous line's prefix onto a new line.
    pub auto_indent: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            multiple_undo: true,
            max_undo_count: DEFAULT_MAX_UNDO_COUNT,
            paste_styled_text: true,
            tab_inserts_spaces: false,
            tab_width: DEFAULT_TAB_WIDTH,
            crm_line_width: DEFAULT_CRM_LINE_WIDTH,
            auto_indent: false,
        }
    }
}

impl TextOptions {
    #[must_use]
    pub const fn with_multiple_undo(mut self, multiple: bool) -> Self {
        self.multiple_undo = multiple;
        self
    }

    /// # Panics
    ///
    /// Panics if `count` is zero.
    #[must_use]
    pub const fn with_max_undo_count(mut self, count: usize) -> Self {
        assert!(count > 0, "undo depth must be positive");
        self.max_undo_count = count;
        self
    }

    #[must_use]
    pub const fn with_paste_styled_text(mut self, styled: bool) -> Self {
        self.paste_styled_text = styled;
        self
    }

    #[must_use]
    pub const fn with_tab_inserts_spaces(mut self, spaces: bool) -> Self {
        self.tab_inserts_spaces = spaces;
        self
    }

    /// # Panics
    ///
    /// Panics if `width` is zero.
    #[must_use]
    pub const fn with_tab_width(mut self, width: usize) -> Self {
        assert!(width > 0, "tab width must be positive");
        self.tab_width = width;
        self
    }

    #[must_use]
    pub const fn with_crm_line_width(mut self, width: usize) -> Self {
        self.crm_line_width = width;
        self
    }

    #[must_use]
    pub const fn with_auto_indent(mut self, auto_indent: bool) -> Self {
        self.auto_indent = auto_indent;
        self
    }

    /// Columns from 0-indexed `column` to the next tab stop.
    #[must_use]
    pub const fn tab_stop_distance(&self, column: usize) -> usize {
        self.tab_width - column % self.tab_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TextOptions::default();
        assert!(opts.multiple_undo);
        assert_eq!(opts.max_undo_count, 100);
        assert_eq!(opts.tab_width, 8);
        assert_eq!(opts.crm_line_width, 75);
        assert!(!opts.tab_inserts_spaces);
        assert!(opts.paste_styled_text);
    }

    #[test]
    fn test_tab_stop_distance() {
        let opts = TextOptions::default().with_tab_width(4);
        assert_eq!(opts.tab_stop_distance(0), 4);
        assert_eq!(opts.tab_stop_distance(1), 3);
        assert_eq!(opts.tab_stop_distance(4), 4);
        assert_eq!(opts.tab_stop_distance(7), 1);
    }

    #[test]
    #[should_panic(expected = "tab width must be positive")]
    fn test_zero_tab_width_panics() {
        let _ = TextOptions::default().with_tab_width(0);
    }
}
