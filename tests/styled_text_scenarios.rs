//! End-to-end scenarios for the styled text buffer.
//!
//! Each module drives a buffer through the public API the way an editor
//! would and checks text, styles, undo state and emitted events.

use std::cell::RefCell;
use std::rc::Rc;

use regex::Regex;
use styled_text::text::{CrmRule, CrmRuleList, StyledText, TextRange};
use styled_text::{Font, PlainTextFormat, PlainTextLoad, TextEvent, TextOptions};

fn recorder(st: &mut StyledText) -> Rc<RefCell<Vec<TextEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    st.set_listener(move |event| sink.borrow_mut().push(event.clone()));
    events
}

/// Route `tracing` output through the test harness so it shows up on failure.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn type_str(st: &mut StyledText, at: usize, text: &str) {
    let mut caret = st.index(at);
    for c in text.chars() {
        let count = st.insert_character(&TextRange::empty_at(caret), c, None);
        caret = caret + count;
    }
}

// ============================================================================
// Typing
// ============================================================================

mod typing {
    use super::*;

    #[test]
    fn consecutive_characters_undo_as_one_step() {
        let mut st = StyledText::default();
        type_str(&mut st, 0, "abc");
        assert_eq!(st.text(), "abc");

        assert!(st.undo());
        assert_eq!(st.text(), "");
        assert!(!st.can_undo());

        assert!(st.redo());
        assert_eq!(st.text(), "abc");
    }

    #[test]
    fn sealed_record_starts_new_step() {
        let mut st = StyledText::default();
        type_str(&mut st, 0, "ab");
        st.deactivate_current_undo();
        type_str(&mut st, 2, "cd");

        st.undo();
        assert_eq!(st.text(), "ab");
        st.undo();
        assert_eq!(st.text(), "");
    }

    #[test]
    fn typing_then_backspace_is_one_step() {
        let mut st = StyledText::with_text("start ", TextOptions::default());
        type_str(&mut st, 6, "wrod");
        let caret = st.beyond_end();
        let line_start = st.paragraph_start(caret);
        let caret = st.backward_delete(line_start, caret, false);
        let line_start = st.paragraph_start(caret);
        let caret = st.backward_delete(line_start, caret, false);
        let caret = st.backward_delete(line_start, caret, false);
        type_str(&mut st, caret.char_index, "ord");
        assert_eq!(st.text(), "start word");

        st.undo();
        assert_eq!(st.text(), "start ");
    }

    #[test]
    fn typed_text_takes_preceding_font() {
        let mut st = StyledText::with_text("ab", TextOptions::default());
        let a = st.char_range(0..1);
        st.set_font_bold(&a, true, true);
        type_str(&mut st, 1, "X");
        assert!(st.font_at(1).style.is_bold());
        assert!(!st.font_at(2).style.is_bold());
    }
}

// ============================================================================
// History Limits
// ============================================================================

mod history {
    use super::*;

    #[test]
    fn depth_capped_history_drops_oldest() {
        init_tracing();
        let options = TextOptions::default().with_max_undo_count(2);
        let mut st = StyledText::with_text("x", options);
        for word in ["one", "two", "three"] {
            let all = st.select_all();
            st.paste(&all, word, None);
        }
        assert_eq!(st.text(), "three");

        assert!(st.undo());
        assert!(st.undo());
        assert_eq!(st.text(), "one");
        assert!(!st.undo());
        assert_eq!(st.text(), "one");
    }

    #[test]
    fn undo_on_empty_history_is_noop() {
        let mut st = StyledText::with_text("text", TextOptions::default());
        assert!(!st.undo());
        assert!(!st.redo());
        assert_eq!(st.text(), "text");
    }

    #[test]
    fn new_edit_discards_redo() {
        let mut st = StyledText::with_text("abc", TextOptions::default());
        let b = st.char_range(1..2);
        st.delete_text(&b);
        st.undo();
        assert!(st.can_redo());

        let c = st.char_range(2..3);
        st.delete_text(&c);
        assert!(!st.can_redo());
        assert_eq!(st.text(), "ab");
    }

    #[test]
    fn save_point_follows_undo() {
        let mut st = StyledText::with_text("doc", TextOptions::default());
        st.set_last_save_location();
        assert!(st.is_at_last_save_location());

        let end = st.beyond_end();
        st.paste(&TextRange::empty_at(end), "!", None);
        assert!(!st.is_at_last_save_location());
        st.undo();
        assert!(st.is_at_last_save_location());
        st.redo();
        assert!(!st.is_at_last_save_location());
    }

    #[test]
    fn single_undo_toggles() {
        let options = TextOptions::default().with_multiple_undo(false);
        let mut st = StyledText::with_text("a", options);
        let all = st.select_all();
        st.paste(&all, "b", None);
        let all = st.select_all();
        st.paste(&all, "c", None);

        st.undo();
        assert_eq!(st.text(), "b");
        st.undo();
        assert_eq!(st.text(), "c");
    }
}

// ============================================================================
// Search
// ============================================================================

mod search {
    use super::*;

    #[test]
    fn forward_search_wraps_once() {
        let st = StyledText::with_text("foo bar baz", TextOptions::default());
        let bar = Regex::new("bar").unwrap();

        let found = st.search_forward(st.index(7), &bar, false, true).unwrap();
        assert_eq!(found.range.chars, 4..7);
        assert!(found.wrapped);

        assert!(st.search_forward(st.index(7), &bar, false, false).is_none());
    }

    #[test]
    fn replace_all_is_one_undo_step() {
        let mut st = StyledText::with_text("cat hat cat", TextOptions::default());
        let cat = Regex::new("cat").unwrap();
        let all = st.select_all();
        let mut progress = styled_text::NoProgress;
        let r = st.replace_all_in_range(&all, &cat, true, "dog", false, false, &mut progress);
        assert_eq!(st.text(), "dog hat dog");
        assert_eq!(r.chars, 0..11);

        st.undo();
        assert_eq!(st.text(), "cat hat cat");
    }

    #[test]
    fn font_search_finds_bold_run() {
        let mut st = StyledText::with_text("plain BOLD plain", TextOptions::default());
        let bold = st.char_range(6..10);
        st.set_font_bold(&bold, true, true);

        let found = st
            .search_forward_font(st.index(0), |font: &Font| font.style.is_bold(), false)
            .unwrap();
        assert_eq!(found.range.chars, 6..10);
    }
}

// ============================================================================
// Reflow
// ============================================================================

mod reflow {
    use super::*;

    #[test]
    fn indent_then_outdent_restores_text() {
        let options = TextOptions::default().with_tab_inserts_spaces(true).with_tab_width(4);
        let mut st = StyledText::with_text("foo\n\tbar\n", options);
        let all = st.select_all();
        let r = st.indent(&all, 1);
        assert_eq!(st.text(), "    foo\n    \tbar\n");

        st.deactivate_current_undo();
        st.outdent(&r, 1, false);
        assert_eq!(st.text(), "foo\n\tbar\n");

        st.undo();
        assert_eq!(st.text(), "    foo\n    \tbar\n");
    }

    #[test]
    fn outdent_short_indent_needs_force() {
        let options = TextOptions::default().with_tab_width(4);
        let mut st = StyledText::with_text(" x", options);
        let all = st.select_all();
        assert!(st.outdent(&all, 1, false).is_empty());
        assert_eq!(st.text(), " x");

        let all = st.select_all();
        st.outdent(&all, 1, true);
        assert_eq!(st.text(), "x");
    }

    #[test]
    fn clean_whitespace_twice_is_stable() {
        let options = TextOptions::default().with_tab_inserts_spaces(true).with_tab_width(4);
        let mut st = StyledText::with_text("\t a  \n   b\t\n", options);
        let all = st.select_all();
        st.clean_whitespace(&all, true);
        let once = st.text();
        assert_eq!(once, "    a\n    b\n");

        let all = st.select_all();
        st.clean_whitespace(&all, true);
        assert_eq!(st.text(), once);
    }
}

// ============================================================================
// Notifications and Filtering
// ============================================================================

mod notifications {
    use super::*;
    use styled_text::text::RunArray;
    use styled_text::{RejectReason, TextFilter};

    #[test]
    fn each_edit_emits_one_event() {
        let mut st = StyledText::with_text("hello", TextOptions::default());
        let events = recorder(&mut st);

        let end = st.beyond_end();
        st.paste(&TextRange::empty_at(end), " world", None);
        let hello = st.char_range(0..5);
        st.set_font_italic(&hello, true, false);
        st.undo();

        let events = events.borrow();
        assert_eq!(events.len(), 3);
        assert!(matches!(
            &events[0],
            TextEvent::TextChanged { char_delta: 6, deletion: false, .. }
        ));
        assert!(matches!(
            &events[1],
            TextEvent::TextChanged { char_delta: 0, .. }
        ));
    }

    struct NoDigits;

    impl TextFilter for NoDigits {
        fn needs_filtering(&self, text: &str) -> bool {
            text.chars().any(|c| c.is_ascii_digit())
        }

        fn filter(&self, _text: &mut String, _styles: Option<&mut RunArray<Font>>) -> bool {
            false
        }
    }

    #[test]
    fn filtered_paste_leaves_buffer_unchanged() {
        init_tracing();
        let mut st = StyledText::with_text("abc", TextOptions::default());
        st.set_filter(NoDigits);
        let events = recorder(&mut st);

        let r = st.char_range(1..2);
        let result = st.paste(&r, "123", None);
        assert!(result.is_empty());
        assert_eq!(st.text(), "abc");
        assert!(!st.can_undo());
        assert_eq!(
            *events.borrow(),
            vec![TextEvent::InputRejected {
                reason: RejectReason::Filtered
            }]
        );
    }
}

// ============================================================================
// Persistence
// ============================================================================

mod persistence {
    use super::*;
    use std::fs::File;
    use std::io::BufReader;

    #[test]
    fn styled_snapshot_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.styled");

        let mut st = StyledText::with_text("Title\nbody text\n", TextOptions::default());
        let title = st.char_range(0..5);
        st.set_font_size(&title, 24, false);
        st.set_font_bold(&title, true, false);
        st.write_private_format(File::create(&path).unwrap(), None).unwrap();

        let mut loaded = StyledText::default();
        assert!(loaded.read_private(BufReader::new(File::open(&path).unwrap())).unwrap());
        assert_eq!(loaded.text(), st.text());
        assert_eq!(loaded.styles(), st.styles());
        assert!(!loaded.can_undo());
    }

    #[test]
    fn plain_text_keeps_newline_convention() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        std::fs::write(&path, "a\r\nb\r\n").unwrap();

        let mut st = StyledText::default();
        let load = st.read_plain_text(File::open(&path).unwrap(), false).unwrap();
        let PlainTextLoad::Loaded { format, clean } = load else {
            panic!("expected text to load");
        };
        assert_eq!(format, PlainTextFormat::Dos);
        assert!(clean);
        assert_eq!(st.text(), "a\nb\n");

        st.write_plain_text(File::create(&path).unwrap(), format).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"a\r\nb\r\n");
    }
}

// ============================================================================
// Line Prefix Rules
// ============================================================================

mod crm_rules {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn shared_rule_list_is_visible_to_buffer() {
        let rules: CrmRuleList = [CrmRule::new(r"[ \t]*>+[ \t]*", r"[ \t]*>+[ \t]*", "$0").unwrap()]
            .into_iter()
            .collect();
        let shared = Arc::new(rules);

        let mut st = StyledText::default();
        st.set_crm_rule_list(Arc::clone(&shared));
        let list = st.crm_rule_list().unwrap();
        assert!(!list.is_owned());
        assert_eq!(list.match_prefix("> quoted", None).len, 2);

        st.clear_crm_rule_list();
        assert!(st.crm_rule_list().is_none());
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}

// ============================================================================
// Contract Violations
// ============================================================================

mod contracts {
    use super::*;

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_past_end_panics() {
        let st = StyledText::with_text("abc", TextOptions::default());
        let _ = st.index(4);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn delete_past_end_panics() {
        let mut st = StyledText::with_text("abc", TextOptions::default());
        let bad = TextRange::new(st.index(2), styled_text::TextCount::new(5, 5));
        st.delete_text(&bad);
    }
}
