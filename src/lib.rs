//! `styled_text` - styled text buffer with integrated undo/redo
//!
//! A mutable Unicode text paired one-to-one with run-length encoded fonts,
//! addressed by character and byte offsets that are kept in step. Edits go
//! through a small set of primitives (typing, paste, delete, move, font
//! changes, indent/outdent, whitespace cleanup) that each record their own
//! inverse in a linear undo history.
//!
//! # Examples
//!
//! ```
//! use styled_text::{StyledText, TextOptions};
//!
//! let mut text = StyledText::with_text("fn main() {}\n", TextOptions::default().with_tab_inserts_spaces(true));
//! let all = text.select_all();
//! text.indent(&all, 1);
//! assert_eq!(text.text(), "        fn main() {}\n");
//!
//! text.undo();
//! assert_eq!(text.text(), "fn main() {}\n");
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Offsets fit in isize for any text that fits in memory
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::module_name_repetitions)] // Allow text::TextRange etc
#![allow(clippy::struct_excessive_bools)] // Options are a set of independent flags
#![allow(clippy::missing_errors_doc)] // Docs WIP
#![allow(clippy::missing_panics_doc)] // Docs WIP
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::inherent_to_string)] // to_string methods are convenient
#![allow(clippy::should_implement_trait)] // from_str naming is intentional
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod color;
pub mod error;
pub mod event;
pub mod font;
pub mod options;
pub mod persist;
pub mod text;

// Re-export core types at crate root
pub use color::Rgb;
pub use error::{Error, Result};
pub use event::{RejectReason, TextEvent};
pub use font::{DefaultFontProvider, Font, FontAttributes, FontProvider, FontStyle};
pub use options::TextOptions;

// Re-export persistence types
pub use persist::{PRIVATE_FORMAT_VERSION, PlainTextFormat, PlainTextLoad};

// Re-export commonly used types
pub use text::{
    FontMatch, NoProgress, ProgressSink, RunArray, StyledText, TextCount, TextFilter, TextIndex,
    TextMatch, TextRange,
};
