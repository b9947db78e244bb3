//! Text store backed by the ropey crate.

use ropey::{Rope, RopeSlice};

use super::index::{TextCount, TextIndex, TextRange};

/// Wrapper around `ropey::Rope` that speaks in paired char/byte indices.
///
/// Ropey keeps both the char and byte lengths of every node, so converting
/// between the two views is logarithmic rather than a UTF-8 scan.
#[derive(Clone, Debug, Default)]
pub struct TextStore {
    rope: Rope,
}

impl TextStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a store from a string.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    #[must_use]
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_bytes() == 0
    }

    /// Index of the character at `char_idx`, with its byte offset.
    ///
    /// # Panics
    ///
    /// Panics if `char_idx` is past the end of the text.
    #[must_use]
    pub fn index(&self, char_idx: usize) -> TextIndex {
        assert!(
            char_idx <= self.len_chars(),
            "char index {char_idx} out of bounds (len {})",
            self.len_chars()
        );
        TextIndex::new(char_idx, self.rope.char_to_byte(char_idx))
    }

    /// The insertion point after the last character.
    #[must_use]
    pub fn end(&self) -> TextIndex {
        TextIndex::new(self.len_chars(), self.len_bytes())
    }

    /// Build a full range from a character range.
    #[must_use]
    pub fn range(&self, chars: std::ops::Range<usize>) -> TextRange {
        TextRange::between(self.index(chars.start), self.index(chars.end))
    }

    /// Character at `char_idx`, if any.
    #[must_use]
    pub fn char_at(&self, char_idx: usize) -> Option<char> {
        self.rope.get_char(char_idx)
    }

    /// Slice of the text covered by `range`.
    #[must_use]
    pub fn slice(&self, range: &TextRange) -> RopeSlice<'_> {
        self.rope.slice(range.chars.clone())
    }

    /// Copy of the text covered by `range`.
    #[must_use]
    pub fn substring(&self, range: &TextRange) -> String {
        self.slice(range).to_string()
    }

    /// Insert text at a position and return its measured length.
    pub fn insert(&mut self, at: TextIndex, text: &str) -> TextCount {
        debug_assert_eq!(self.rope.char_to_byte(at.char_index), at.byte_index);
        self.rope.insert(at.char_index, text);
        TextCount::of(text)
    }

    /// Remove a range of characters.
    pub fn remove(&mut self, range: &TextRange) {
        debug_assert_eq!(self.rope.char_to_byte(range.chars.start), range.bytes.start);
        self.rope.remove(range.chars.clone());
    }

    /// Replace the entire contents.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    pub fn clear(&mut self) {
        self.rope = Rope::new();
    }

    /// Convert to string.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Iterate over characters starting at `char_idx`.
    pub fn chars_at(&self, char_idx: usize) -> ropey::iter::Chars<'_> {
        self.rope.chars_at(char_idx)
    }

    /// Get access to the underlying rope.
    #[must_use]
    pub fn inner(&self) -> &Rope {
        &self.rope
    }
}

impl From<&str> for TextStore {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_basic() {
        let store = TextStore::from_str("bîg\nbøld");
        assert_eq!(store.len_chars(), 8);
        assert_eq!(store.len_bytes(), 10);
        assert_eq!(store.index(4), TextIndex::new(4, 5));
        assert_eq!(store.index(4).byte_index, 5);
        assert_eq!(store.end().byte_index, 10);
    }

    #[test]
    fn test_store_insert_remove() {
        let mut store = TextStore::from_str("abc");
        let at = store.index(1);
        let count = store.insert(at, "øø");
        assert_eq!(count, TextCount::new(2, 4));
        assert_eq!(store.to_string(), "aøøbc");

        let range = store.range(1..3);
        assert_eq!(range.bytes, 1..5);
        store.remove(&range);
        assert_eq!(store.to_string(), "abc");
    }

    #[test]
    fn test_store_substring() {
        let store = TextStore::from_str("Fourscøre and");
        let range = store.range(4..9);
        assert_eq!(store.substring(&range), "scøre");
        assert_eq!(range.bytes, 4..10);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_store_index_out_of_bounds() {
        let store = TextStore::from_str("ab");
        let _ = store.index(3);
    }
}
