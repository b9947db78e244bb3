//! Input cleaning applied before text enters a buffer.
//!
//! Cleaning runs in three stages, each guarded by a cheap containment test so
//! already-clean text is never copied:
//!
//! 1. control characters the buffer cannot hold are dropped, with their styles
//! 2. DOS and legacy Mac line endings become `\n`
//! 3. an optional [`TextFilter`] may rewrite the text or reject it outright

use crate::font::Font;

use super::runs::RunArray;

/// Extra filtering hook for text entering a buffer.
pub trait TextFilter {
    /// Whether [`filter`](Self::filter) has anything to do for this text.
    fn needs_filtering(&self, text: &str) -> bool;

    /// Rewrite `text` (and `styles`, keeping one entry per character).
    /// Returning `false` rejects the whole input.
    fn filter(&self, text: &mut String, styles: Option<&mut RunArray<Font>>) -> bool;
}

/// Result of [`clean_text`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cleaned {
    /// Nothing needed changing.
    Unchanged,
    /// Text (and styles) were rewritten.
    Modified,
    /// The filter refused the input.
    Rejected,
}

impl Cleaned {
    /// The input may be used.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Control characters that never appear in a buffer.
#[must_use]
pub const fn is_illegal_char(c: char) -> bool {
    matches!(c, '\0'..='\x08' | '\x0B' | '\x0E'..='\x1F' | '\x7F')
}

/// True if `text` holds any character [`clean_text`] would drop.
#[must_use]
pub fn contains_illegal_chars(text: &str) -> bool {
    text.chars().any(is_illegal_char)
}

/// Clean `text` in place, keeping `styles` the same length.
pub fn clean_text(
    text: &mut String,
    mut styles: Option<&mut RunArray<Font>>,
    filter: Option<&dyn TextFilter>,
) -> Cleaned {
    if let Some(styles) = styles.as_deref() {
        assert_eq!(
            styles.len(),
            text.chars().count(),
            "style count does not match text length"
        );
    }

    let mut modified = false;

    if contains_illegal_chars(text) {
        remove_chars(text, styles.as_deref_mut(), is_illegal_char);
        modified = true;
    }

    if text.contains("\r\n") {
        remove_chars(text, styles.as_deref_mut(), |c| c == '\r');
        modified = true;
    } else if text.contains('\r') {
        *text = text.replace('\r', "\n");
        modified = true;
    }

    if let Some(filter) = filter {
        if filter.needs_filtering(text) {
            if !filter.filter(text, styles.as_deref_mut()) {
                tracing::warn!(len = text.len(), "text filter rejected input");
                return Cleaned::Rejected;
            }
            modified = true;
        }
    }

    if modified {
        Cleaned::Modified
    } else {
        Cleaned::Unchanged
    }
}

/// Drop every character matching `pred` together with its style element.
fn remove_chars(text: &mut String, styles: Option<&mut RunArray<Font>>, pred: impl Fn(char) -> bool) {
    match styles {
        Some(styles) => {
            let mut kept_text = String::with_capacity(text.len());
            let mut kept_styles = RunArray::new();
            for (c, font) in text.chars().zip(styles.values()) {
                if !pred(c) {
                    kept_text.push(c);
                    kept_styles.push(font.clone(), 1);
                }
            }
            *text = kept_text;
            *styles = kept_styles;
        }
        None => text.retain(|c| !pred(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperOnly;

    impl TextFilter for UpperOnly {
        fn needs_filtering(&self, text: &str) -> bool {
            text.chars().any(char::is_lowercase)
        }

        fn filter(&self, text: &mut String, _styles: Option<&mut RunArray<Font>>) -> bool {
            if text.contains('!') {
                return false;
            }
            *text = text.to_uppercase();
            true
        }
    }

    #[test]
    fn test_clean_text_untouched() {
        let mut text = String::from("plain\ttext\n");
        assert_eq!(clean_text(&mut text, None, None), Cleaned::Unchanged);
        assert_eq!(text, "plain\ttext\n");
    }

    #[test]
    fn test_clean_text_strips_controls_and_styles() {
        let bold = Font::default().with_bold(true);
        let mut text = String::from("a\x01b\x7f");
        let mut styles = RunArray::filled(Font::default(), 1);
        styles.push(bold.clone(), 3);

        assert_eq!(
            clean_text(&mut text, Some(&mut styles), None),
            Cleaned::Modified
        );
        assert_eq!(text, "ab");
        assert_eq!(styles.len(), 2);
        assert_eq!(*styles.get(1), bold);
    }

    #[test]
    fn test_clean_text_newlines() {
        let mut dos = String::from("one\r\ntwo\r\n");
        let mut styles = RunArray::filled(Font::default(), 10);
        clean_text(&mut dos, Some(&mut styles), None);
        assert_eq!(dos, "one\ntwo\n");
        assert_eq!(styles.len(), 8);

        let mut mac = String::from("one\rtwo\r");
        clean_text(&mut mac, None, None);
        assert_eq!(mac, "one\ntwo\n");
    }

    #[test]
    fn test_clean_text_filter() {
        let mut text = String::from("shout");
        assert_eq!(
            clean_text(&mut text, None, Some(&UpperOnly)),
            Cleaned::Modified
        );
        assert_eq!(text, "SHOUT");

        let mut text = String::from("no!");
        let result = clean_text(&mut text, None, Some(&UpperOnly));
        assert_eq!(result, Cleaned::Rejected);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_illegal_char_set() {
        assert!(is_illegal_char('\0'));
        assert!(is_illegal_char('\x0B'));
        assert!(!is_illegal_char('\t'));
        assert!(!is_illegal_char('\n'));
        assert!(!is_illegal_char('\x0C'));
        assert!(!is_illegal_char('\r'));
        assert!(contains_illegal_chars("bin\x00ary"));
    }
}
