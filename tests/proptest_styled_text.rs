//! Property-based tests for the styled text buffer.
//!
//! Uses proptest to check the invariants every edit must preserve: text and
//! styles stay the same length, char and byte offsets agree, and undo/redo
//! exactly reverse each other.

use proptest::prelude::*;
use regex::Regex;
use styled_text::text::{RunArray, StyledText, TextRange};
use styled_text::TextOptions;

// ============================================================================
// Strategies
// ============================================================================

/// Short strings over a mix of one- to three-byte characters, tabs and newlines.
fn text_strategy(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec!['a', 'b', 'z', ' ', ' ', '\t', '\n', 'é', 'ø', '中']),
        0..max,
    )
    .prop_map(|chars| chars.into_iter().collect())
}

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, String),
    Type(usize, char),
    Delete(usize, usize),
    Paste(usize, usize, String),
    Backspace(usize),
    Bold(usize, usize),
    Size(usize, usize, u16),
    Move(usize, usize, usize, bool),
    Indent(usize, usize),
    Outdent(usize, usize, bool),
    Clean(usize, usize, bool),
    Seal,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let pos = 0usize..1000;
    prop_oneof![
        (pos.clone(), text_strategy(6)).prop_map(|(a, t)| Op::Insert(a, t)),
        (pos.clone(), prop::sample::select(vec!['x', 'é', '\n', ' '])).prop_map(|(a, c)| Op::Type(a, c)),
        (pos.clone(), pos.clone()).prop_map(|(a, b)| Op::Delete(a, b)),
        (pos.clone(), pos.clone(), text_strategy(6)).prop_map(|(a, b, t)| Op::Paste(a, b, t)),
        pos.clone().prop_map(Op::Backspace),
        (pos.clone(), pos.clone()).prop_map(|(a, b)| Op::Bold(a, b)),
        (pos.clone(), pos.clone(), 8u16..30).prop_map(|(a, b, s)| Op::Size(a, b, s)),
        (pos.clone(), pos.clone(), pos.clone(), any::<bool>()).prop_map(|(a, b, d, c)| Op::Move(a, b, d, c)),
        (pos.clone(), pos.clone()).prop_map(|(a, b)| Op::Indent(a, b)),
        (pos.clone(), pos.clone(), any::<bool>()).prop_map(|(a, b, f)| Op::Outdent(a, b, f)),
        (pos.clone(), pos.clone(), any::<bool>()).prop_map(|(a, b, al)| Op::Clean(a, b, al)),
        Just(Op::Seal),
    ]
}

/// Map two arbitrary numbers onto a valid range of `st`.
fn range_of(st: &StyledText, a: usize, b: usize) -> TextRange {
    let len = st.len_chars() + 1;
    let (a, b) = (a % len, b % len);
    st.char_range(a.min(b)..a.max(b))
}

fn apply(st: &mut StyledText, op: &Op) {
    let len = st.len_chars() + 1;
    match op {
        Op::Insert(a, text) => {
            st.insert_text(st.index(a % len), text, None, None);
        }
        Op::Type(a, c) => {
            let at = st.index(a % len);
            st.insert_character(&TextRange::empty_at(at), *c, None);
        }
        Op::Delete(a, b) => {
            let r = range_of(st, *a, *b);
            st.delete_text(&r);
        }
        Op::Paste(a, b, text) => {
            let r = range_of(st, *a, *b);
            st.paste(&r, text, None);
        }
        Op::Backspace(a) => {
            let caret = st.index(a % len);
            let line_start = st.paragraph_start(caret);
            st.backward_delete(line_start, caret, false);
        }
        Op::Bold(a, b) => {
            let r = range_of(st, *a, *b);
            st.set_font_bold(&r, true, false);
        }
        Op::Size(a, b, size) => {
            let r = range_of(st, *a, *b);
            st.set_font_size(&r, *size, false);
        }
        Op::Move(a, b, d, copy) => {
            let r = range_of(st, *a, *b);
            let dest = st.index(d % len);
            st.move_text(&r, dest, *copy);
        }
        Op::Indent(a, b) => {
            let r = range_of(st, *a, *b);
            st.indent(&r, 1);
        }
        Op::Outdent(a, b, force) => {
            let r = range_of(st, *a, *b);
            st.outdent(&r, 1, *force);
        }
        Op::Clean(a, b, align) => {
            let r = range_of(st, *a, *b);
            st.clean_whitespace(&r, *align);
        }
        Op::Seal => st.deactivate_current_undo(),
    }
}

fn assert_consistent(st: &StyledText) -> Result<(), TestCaseError> {
    let text = st.text();
    prop_assert_eq!(st.styles().len(), st.len_chars());
    prop_assert_eq!(text.chars().count(), st.len_chars());
    prop_assert_eq!(text.len(), st.len_bytes());
    prop_assert!(st.styles().is_consistent());
    let end = st.beyond_end();
    prop_assert_eq!(end.byte_index, text.len());
    Ok(())
}

// ============================================================================
// Edit Invariants
// ============================================================================

proptest! {
    /// Text and style stores never drift apart.
    #[test]
    fn edits_keep_stores_in_sync(
        initial in text_strategy(30),
        ops in prop::collection::vec(op_strategy(), 0..25),
    ) {
        let mut st = StyledText::with_text(&initial, TextOptions::default().with_tab_width(4));
        for op in &ops {
            apply(&mut st, op);
            assert_consistent(&st)?;
        }
    }

    /// Undoing everything restores the original; redoing everything restores the result.
    #[test]
    fn undo_redo_are_inverse(
        initial in text_strategy(30),
        spaces in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 0..25),
    ) {
        let options = TextOptions::default()
            .with_tab_width(4)
            .with_tab_inserts_spaces(spaces);
        let mut st = StyledText::with_text(&initial, options);
        let original_styles = st.styles().clone();
        for op in &ops {
            apply(&mut st, op);
        }
        let final_text = st.text();
        let final_styles = st.styles().clone();

        let mut undone = 0;
        while st.undo() {
            undone += 1;
            prop_assert!(undone <= ops.len(), "more undo steps than edits");
        }
        prop_assert_eq!(st.text(), initial);
        prop_assert_eq!(st.styles(), &original_styles);
        prop_assert!(!st.can_undo());

        for _ in 0..undone {
            prop_assert!(st.redo());
        }
        prop_assert!(!st.can_redo());
        prop_assert_eq!(st.text(), final_text);
        prop_assert_eq!(st.styles(), &final_styles);
        assert_consistent(&st)?;
    }

    /// Pasting a copy back over its source changes nothing.
    #[test]
    fn copy_paste_round_trip(
        initial in text_strategy(40),
        ops in prop::collection::vec(op_strategy(), 0..10),
        a in 0usize..1000,
        b in 0usize..1000,
    ) {
        let mut st = StyledText::with_text(&initial, TextOptions::default());
        for op in &ops {
            apply(&mut st, op);
        }
        let before_text = st.text();
        let before_styles = st.styles().clone();

        let r = range_of(&st, a, b);
        if let Some((text, styles)) = st.copy(&r) {
            let pasted = st.paste(&r, &text, Some(&styles));
            prop_assert_eq!(pasted, r);
            prop_assert_eq!(st.text(), before_text);
            prop_assert_eq!(st.styles(), &before_styles);
        }
    }

    /// Every index pairs a char offset with the byte offset of the same character.
    #[test]
    fn indices_pair_chars_and_bytes(text in text_strategy(60)) {
        let st = StyledText::with_text(&text, TextOptions::default());
        for (i, (byte, _)) in text.char_indices().enumerate() {
            let index = st.index(i);
            prop_assert_eq!(index.byte_index, byte);
        }
        let r = st.select_all();
        prop_assert_eq!(r.bytes, 0..text.len());
    }

    /// Forward search of a literal agrees with `str::find`.
    #[test]
    fn search_forward_matches_find(
        text in text_strategy(60),
        needle in "[abz ]{1,3}",
    ) {
        let st = StyledText::with_text(&text, TextOptions::default());
        let regex = Regex::new(&regex::escape(&needle)).unwrap();
        let found = st.search_forward(st.index(0), &regex, false, false);
        match text.find(&needle) {
            Some(byte) => {
                let m = found.expect("match expected");
                prop_assert_eq!(m.range.bytes.clone(), byte..byte + needle.len());
                prop_assert_eq!(m.range.chars.start, text[..byte].chars().count());
                prop_assert!(!m.wrapped);
            }
            None => prop_assert!(found.is_none()),
        }
    }
}

// ============================================================================
// Run Store Properties
// ============================================================================

proptest! {
    /// Setting a range changes exactly that range.
    #[test]
    fn run_array_set_range(
        runs in prop::collection::vec((0u8..4, 1usize..6), 0..12),
        a in 0usize..100,
        b in 0usize..100,
        value in 0u8..4,
    ) {
        let mut array = RunArray::new();
        for (v, n) in &runs {
            array.push(*v, *n);
        }
        let before: Vec<u8> = array.values().copied().collect();
        let len = array.len() + 1;
        let (a, b) = ((a % len).min(b % len), (a % len).max(b % len));

        array.set_range(a..b, value);
        prop_assert!(array.is_consistent());
        prop_assert_eq!(array.len(), before.len());
        for (i, v) in array.values().enumerate() {
            let expected = if (a..b).contains(&i) { value } else { before[i] };
            prop_assert_eq!(*v, expected);
        }
        let total: usize = array.runs().iter().map(|run| run.len).sum();
        prop_assert_eq!(total, array.len());
    }
}
