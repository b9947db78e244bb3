//! Paired character/byte positions, lengths and ranges.
//!
//! Every position inside a [`StyledText`](crate::StyledText) is carried as a
//! character offset together with the byte offset of the same character in
//! the UTF-8 text. The pairs are built from the text store and move together,
//! so no API needs to re-scan UTF-8 to convert between the two.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Range, Sub};

/// A position in the text, in both characters and bytes.
///
/// Equality and ordering only look at the character offset; the byte offset
/// is derived from it.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextIndex {
    /// Character offset (0-indexed).
    pub char_index: usize,
    /// Byte offset of the same character (0-indexed).
    pub byte_index: usize,
}

impl TextIndex {
    /// Start of the text.
    pub const ZERO: Self = Self {
        char_index: 0,
        byte_index: 0,
    };

    #[must_use]
    pub const fn new(char_index: usize, byte_index: usize) -> Self {
        Self {
            char_index,
            byte_index,
        }
    }

    /// Distance from `self` to a later index.
    #[must_use]
    pub fn count_to(self, end: Self) -> TextCount {
        debug_assert!(end.char_index >= self.char_index);
        TextCount::new(
            end.char_index - self.char_index,
            end.byte_index - self.byte_index,
        )
    }
}

impl PartialEq for TextIndex {
    fn eq(&self, other: &Self) -> bool {
        self.char_index == other.char_index
    }
}

impl Eq for TextIndex {}

impl PartialOrd for TextIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TextIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.char_index.cmp(&other.char_index)
    }
}

impl Add<TextCount> for TextIndex {
    type Output = Self;

    fn add(self, count: TextCount) -> Self {
        Self::new(
            self.char_index + count.chars,
            self.byte_index + count.bytes,
        )
    }
}

impl Sub<TextCount> for TextIndex {
    type Output = Self;

    fn sub(self, count: TextCount) -> Self {
        Self::new(
            self.char_index - count.chars,
            self.byte_index - count.bytes,
        )
    }
}

/// A length of text, in both characters and bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextCount {
    pub chars: usize,
    pub bytes: usize,
}

impl TextCount {
    pub const ZERO: Self = Self { chars: 0, bytes: 0 };

    #[must_use]
    pub const fn new(chars: usize, bytes: usize) -> Self {
        Self { chars, bytes }
    }

    /// Measure a string.
    #[must_use]
    pub fn of(text: &str) -> Self {
        Self::new(text.chars().count(), text.len())
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.chars == 0
    }
}

impl Add for TextCount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.chars + other.chars, self.bytes + other.bytes)
    }
}

impl AddAssign for TextCount {
    fn add_assign(&mut self, other: Self) {
        self.chars += other.chars;
        self.bytes += other.bytes;
    }
}

/// A half-open span of text, in both characters and bytes.
///
/// `chars.is_empty() == bytes.is_empty()` holds for every range built by this
/// crate. An empty range still carries a position: that is where an insertion
/// would land.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub chars: Range<usize>,
    pub bytes: Range<usize>,
}

impl TextRange {
    /// Build a range from its start and length.
    #[must_use]
    pub fn new(first: TextIndex, count: TextCount) -> Self {
        Self {
            chars: first.char_index..first.char_index + count.chars,
            bytes: first.byte_index..first.byte_index + count.bytes,
        }
    }

    /// Build a range from its two end points.
    #[must_use]
    pub fn between(first: TextIndex, beyond: TextIndex) -> Self {
        assert!(
            first.char_index <= beyond.char_index && first.byte_index <= beyond.byte_index,
            "inverted text range {first:?}..{beyond:?}"
        );
        Self {
            chars: first.char_index..beyond.char_index,
            bytes: first.byte_index..beyond.byte_index,
        }
    }

    /// An empty range positioned at `index`.
    #[must_use]
    pub fn empty_at(index: TextIndex) -> Self {
        Self::new(index, TextCount::ZERO)
    }

    #[must_use]
    pub fn first(&self) -> TextIndex {
        TextIndex::new(self.chars.start, self.bytes.start)
    }

    /// The index just past the last character.
    #[must_use]
    pub fn after(&self) -> TextIndex {
        TextIndex::new(self.chars.end, self.bytes.end)
    }

    #[must_use]
    pub fn count(&self) -> TextCount {
        TextCount::new(self.chars.len(), self.bytes.len())
    }

    /// Resize the range, keeping its start.
    pub fn set_count(&mut self, count: TextCount) {
        self.chars.end = self.chars.start + count.chars;
        self.bytes.end = self.bytes.start + count.bytes;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// True when the char and byte halves agree about emptiness.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.chars.is_empty() == self.bytes.is_empty()
            && self.chars.start <= self.chars.end
            && self.bytes.start <= self.bytes.end
    }

    /// Whether `char_index` lies inside the range.
    #[must_use]
    pub fn contains(&self, char_index: usize) -> bool {
        self.chars.contains(&char_index)
    }
}

impl AddAssign<TextCount> for TextRange {
    fn add_assign(&mut self, count: TextCount) {
        self.chars.end += count.chars;
        self.bytes.end += count.bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_ordering_uses_chars() {
        let a = TextIndex::new(3, 5);
        let b = TextIndex::new(3, 7);
        assert_eq!(a, b);
        assert!(TextIndex::new(2, 9) < a);
    }

    #[test]
    fn test_index_arithmetic() {
        let idx = TextIndex::new(2, 3) + TextCount::new(4, 6);
        assert_eq!(idx.char_index, 6);
        assert_eq!(idx.byte_index, 9);
        assert_eq!(TextIndex::new(2, 3).count_to(idx), TextCount::new(4, 6));
    }

    #[test]
    fn test_range_accessors() {
        let mut r = TextRange::new(TextIndex::new(1, 1), TextCount::of("øx"));
        assert_eq!(r.chars, 1..3);
        assert_eq!(r.bytes, 1..4);
        assert_eq!(r.after(), TextIndex::new(3, 4));
        assert!(r.is_consistent());

        r += TextCount::of("é");
        assert_eq!(r.count(), TextCount::new(3, 5));

        r.set_count(TextCount::ZERO);
        assert!(r.is_empty());
        assert_eq!(r.first(), TextIndex::new(1, 1));
    }

    #[test]
    #[should_panic(expected = "inverted text range")]
    fn test_between_rejects_inverted() {
        let _ = TextRange::between(TextIndex::new(4, 4), TextIndex::new(2, 2));
    }
}
