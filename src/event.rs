//! Change notifications emitted by a buffer.
//!
//! A [`StyledText`](crate::StyledText) holds at most one listener and calls
//! it synchronously once per mutating operation, after the text and style
//! stores agree again.

use std::fmt;

use crate::text::TextRange;

/// Something that happened to a buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextEvent {
    /// The whole text was replaced.
    TextSet,
    /// Part of the text or its styles changed.
    TextChanged {
        /// Range now covering the edited content.
        range: TextRange,
        /// Change in character count (negative for deletions).
        char_delta: isize,
        /// Change in byte count.
        byte_delta: isize,
        /// Existing content was removed or replaced.
        deletion: bool,
    },
    /// The font used for unstyled text changed.
    DefaultFontChanged,
    /// Input was refused; the buffer is unchanged.
    InputRejected { reason: RejectReason },
}

/// Why input was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Plain-text input held control characters and binary input was not accepted.
    Binary,
    /// The text filter refused the input.
    Filtered,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "input looks like binary data"),
            Self::Filtered => write!(f, "input was rejected by the text filter"),
        }
    }
}

pub(crate) type Listener = Box<dyn FnMut(&TextEvent)>;

/// Slot holding the optional listener.
#[derive(Default)]
pub(crate) struct Notifier {
    listener: Option<Listener>,
}

impl Notifier {
    pub fn set(&mut self, listener: Listener) {
        self.listener = Some(listener);
    }

    pub fn clear(&mut self) {
        self.listener = None;
    }

    /// Deliver an event to the listener, if any.
    pub fn emit(&mut self, event: &TextEvent) {
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listener", &self.listener.is_some())
            .finish()
    }
}
