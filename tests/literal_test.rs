use basecalc_shell::literal::{rewrite, scan, Span, SpanKind};
use basecalc_shell::{Base, ConversionError};

fn literal(start: usize, end: usize) -> Span {
    Span {
        kind: SpanKind::Literal,
        range: start..end,
    }
}

fn other(start: usize, end: usize) -> Span {
    Span {
        kind: SpanKind::Other,
        range: start..end,
    }
}

#[test]
fn test_scan_binary() {
    assert_eq!(
        vec![literal(0, 3), other(3, 4), literal(4, 5)],
        scan("101+1", Base::Binary)
    );
    // Digits inside a name belong to the name.
    assert_eq!(
        vec![other(0, 6), literal(6, 8), other(8, 9)],
        scan("Log10(10)", Base::Binary)
    );
}

#[test]
fn test_scan_hex() {
    assert_eq!(
        vec![literal(0, 4), other(4, 7)],
        scan("0xff+10", Base::Hex)
    );
    assert_eq!(vec![other(0, 4)], scan("0x+1", Base::Hex));
}

#[test]
fn test_scan_decimal_is_one_span() {
    assert_eq!(vec![other(0, 5)], scan("101+1", Base::Decimal));
    assert!(scan("", Base::Decimal).is_empty());
}

#[test]
fn test_rewrite_binary() {
    let cases = [
        ("101+1", "5+1"),
        ("1+11+1", "1+3+1"),
        ("11*11", "3*3"),
        ("(10)", "(2)"),
        ("Log10(1000)", "Log10(8)"),
        ("x2+1", "x2+1"),
        ("11111111111111111111111111111111+1", "(-1)+1"),
        ("", ""),
    ];

    for (input, expect) in cases {
        assert_eq!(Ok(expect.to_owned()), rewrite(input, Base::Binary));
    }
}

#[test]
fn test_rewrite_hex() {
    let cases = [
        ("0xff+0XA", "255+10"),
        ("0x10*2", "16*2"),
        ("10+0x1", "10+1"),
        ("a0x1", "a0x1"),
        ("0xffffffff", "(-1)"),
        ("Sqrt(0x10)", "Sqrt(16)"),
    ];

    for (input, expect) in cases {
        assert_eq!(Ok(expect.to_owned()), rewrite(input, Base::Hex));
    }
}

#[test]
fn test_rewrite_rejects_bad_literals() {
    assert_eq!(
        Err(ConversionError::InvalidLiteral {
            text: "102".into(),
            base: "Binary"
        }),
        rewrite("102+1", Base::Binary)
    );
    assert_eq!(
        Err(ConversionError::NonIntegral("1.1".into())),
        rewrite("1.1", Base::Binary)
    );
    assert_eq!(
        Err(ConversionError::OutOfRange("100000000".into())),
        rewrite("0x100000000", Base::Hex)
    );
}

#[test]
fn test_decimal_passes_through() {
    assert_eq!(Ok("2.5*x+0x1".to_owned()), rewrite("2.5*x+0x1", Base::Decimal));
    // Binary-looking and malformed text is left for the evaluator to judge.
    assert_eq!(Ok("102+1.1.1".to_owned()), rewrite("102+1.1.1", Base::Decimal));
}
