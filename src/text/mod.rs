//! Styled text storage, editing and undo.
//!
//! The layers, bottom up:
//!
//! - [`TextStore`]: rope-backed text addressed by paired char/byte indices
//! - [`RunArray`]: run-length store holding one value per character
//! - [`clean_text`]: input cleaning applied before anything is stored
//! - [`UndoHistory`]: linear undo/redo over [`UndoRecord`]s
//! - [`StyledText`]: the buffer tying them together, plus search, reflow and
//!   line-prefix rules
//!
//! All positions are zero-based and ranges are half-open. A [`TextIndex`]
//! carries both the character offset and the matching byte offset so callers
//! holding one never have to rescan the text for the other.
//!
//! # Examples
//!
//! ## Typing and undo
//!
//! ```
//! use styled_text::{StyledText, TextOptions, TextRange};
//!
//! let mut text = StyledText::new(TextOptions::default());
//! let mut caret = text.beyond_end();
//! for c in "hello".chars() {
//!     let count = text.insert_character(&TextRange::empty_at(caret), c, None);
//!     caret = caret + count;
//! }
//! assert_eq!(text.text(), "hello");
//!
//! // consecutive keystrokes undo together
//! text.undo();
//! assert!(text.is_empty());
//! ```
//!
//! ## Search and replace
//!
//! ```
//! use regex::Regex;
//! use styled_text::{StyledText, TextOptions};
//!
//! let mut text = StyledText::with_text("one two one", TextOptions::default());
//! let one = Regex::new("one").unwrap();
//!
//! let found = text.search_forward(text.index(1), &one, false, true).unwrap();
//! assert_eq!(found.range.chars, 8..11);
//! assert!(!found.wrapped);
//!
//! text.replace_match(&found, &one, "three", false, false);
//! assert_eq!(text.text(), "one two three");
//! ```

mod clean;
mod crm;
mod index;
mod reflow;
mod rope;
mod runs;
mod search;
mod styled;
mod undo;

pub use clean::{Cleaned, TextFilter, clean_text, contains_illegal_chars, is_illegal_char};
pub use crm::{CrmRule, CrmRuleList, CrmRules, PrefixMatch};
pub use index::{TextCount, TextIndex, TextRange};
pub use rope::TextStore;
pub use runs::{Run, RunArray};
pub use search::{FontMatch, NoProgress, ProgressSink, TextMatch, match_case};
pub use styled::{StyledText, WordPredicate, default_is_char_in_word};
pub use undo::{DEFAULT_MAX_UNDO_COUNT, Replacement, UndoHistory, UndoRecord, UndoState};
