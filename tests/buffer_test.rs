use basecalc_shell::LineBuffer;
use chrono::Duration;

#[test]
fn test_tokens_concatenate_into_snapshot() {
    let mut buffer = LineBuffer::new();
    for token in ["1", "+", "Sin(", "0", ")"] {
        buffer.append_token(token);
    }

    assert_eq!("1+Sin(0)", buffer.submit_line());
    assert_eq!(8, buffer.cursor_col());
    // Submitting does not touch the buffer.
    assert_eq!(1, buffer.lines().len());
    assert_eq!("1+Sin(0)", buffer.current_line());
}

#[test]
fn test_delete_at_column_zero_is_a_no_op() {
    let mut buffer = LineBuffer::new();
    buffer.append_token("12");
    buffer.delete_one();
    assert_eq!("1", buffer.current_line());
    assert_eq!(1, buffer.cursor_col());

    for _ in 0..5 {
        buffer.delete_one();
        assert_eq!("", buffer.current_line());
        assert_eq!(0, buffer.cursor_col());
    }
}

#[test]
fn test_set_current_line_counts_characters() {
    let mut buffer = LineBuffer::new();
    buffer.append_token("junk");
    buffer.set_current_line("π*2");

    assert_eq!("π*2", buffer.current_line());
    assert_eq!(3, buffer.cursor_col());

    buffer.delete_one();
    assert_eq!("π*", buffer.current_line());
}

#[test]
fn test_commit_opens_a_fresh_line() {
    let mut buffer = LineBuffer::new();
    buffer.append_token("1+1");
    buffer.commit_result("1+1 = 2");

    assert_eq!(&["1+1", "1+1 = 2", ""], buffer.lines());
    assert_eq!(2, buffer.cursor_row());
    assert_eq!(0, buffer.cursor_col());
}

#[test]
fn test_render_transcript() {
    let mut buffer = LineBuffer::new();
    buffer.append_token("1+1");
    buffer.commit_result("1+1 = 2");
    buffer.append_token("3");

    assert_eq!(" 1+1\n 1+1 = 2\n>3", buffer.render());

    buffer.set_cursor_visible(true);
    assert_eq!(" 1+1\n 1+1 = 2\n>3_", buffer.render());
}

#[test]
fn test_clear_leaves_only_the_prompt() {
    let mut buffer = LineBuffer::new();
    buffer.append_token("x=5");
    buffer.commit_result("x=5");
    buffer.clear();

    assert_eq!(">", buffer.render());
    assert_eq!(1, buffer.lines().len());

    buffer.set_cursor_visible(true);
    assert_eq!(">_", buffer.render());
}

#[test]
fn test_cursor_blinks_after_interval() {
    let mut buffer = LineBuffer::with_glyphs('>', '_', Duration::milliseconds(500));
    assert!(!buffer.cursor_visible());

    buffer.tick(Duration::milliseconds(300));
    assert!(!buffer.cursor_visible());

    buffer.tick(Duration::milliseconds(300));
    assert!(buffer.cursor_visible());

    // The accumulator restarted, and the interval must be exceeded, not met.
    buffer.tick(Duration::milliseconds(500));
    assert!(buffer.cursor_visible());

    buffer.tick(Duration::milliseconds(1));
    assert!(!buffer.cursor_visible());
}

#[test]
fn test_custom_glyphs() {
    let mut buffer = LineBuffer::with_glyphs('$', '|', Duration::milliseconds(100));
    buffer.append_token("7");
    buffer.tick(Duration::milliseconds(150));

    assert_eq!("$7|", buffer.render());
}
