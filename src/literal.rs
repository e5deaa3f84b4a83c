//! Base-aware literal scanning.
//!
//! Before an expression reaches the evaluator every literal written in the
//! active base is replaced by its decimal text. Scanning produces a list of
//! spans and the rewrite walks them once, so substituted text is never scanned
//! again.

use crate::base::{binary_to_decimal, hex_to_decimal, Base};
use crate::error::ConversionError;
use std::ops::Range;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A numeral in the active base's lexical form.
    Literal,
    /// Anything else, copied through unchanged.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub range: Range<usize>,
}

fn is_identifier_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn push_other(spans: &mut Vec<Span>, range: Range<usize>) {
    if let Some(last) = spans.last_mut() {
        if last.kind == SpanKind::Other && last.range.end == range.start {
            last.range.end = range.end;
            return;
        }
    }
    spans.push(Span {
        kind: SpanKind::Other,
        range,
    });
}

/// Splits `input` into literal and non-literal spans for `base`.
///
/// Binary literals are maximal runs of digits and points; hex literals are
/// `0x` followed by hex digits. Digits glued to an identifier (`Log10`, `x2`)
/// belong to the identifier. In decimal everything is `Other`.
pub fn scan(input: &str, base: Base) -> Vec<Span> {
    let bytes = input.as_bytes();
    let mut spans = Vec::new();
    let mut index = 0;

    if base == Base::Decimal {
        if !input.is_empty() {
            push_other(&mut spans, 0..input.len());
        }
        return spans;
    }

    while index < bytes.len() {
        let c = bytes[index];

        if c.is_ascii_alphabetic() || c == b'_' {
            let start = index;
            while index < bytes.len() && is_identifier_byte(bytes[index]) {
                index += 1;
            }
            push_other(&mut spans, start..index);
            continue;
        }

        if c.is_ascii_digit() || c == b'.' {
            let start = index;
            if base == Base::Hex {
                if c == b'0'
                    && index + 2 < bytes.len()
                    && (bytes[index + 1] == b'x' || bytes[index + 1] == b'X')
                    && bytes[index + 2].is_ascii_hexdigit()
                {
                    index += 2;
                    while index < bytes.len() && bytes[index].is_ascii_hexdigit() {
                        index += 1;
                    }
                    spans.push(Span {
                        kind: SpanKind::Literal,
                        range: start..index,
                    });
                } else {
                    // A plain decimal number stays decimal in hex mode.
                    while index < bytes.len()
                        && (bytes[index].is_ascii_digit() || bytes[index] == b'.')
                    {
                        index += 1;
                    }
                    push_other(&mut spans, start..index);
                }
            } else {
                while index < bytes.len() && (bytes[index].is_ascii_digit() || bytes[index] == b'.')
                {
                    index += 1;
                }
                spans.push(Span {
                    kind: SpanKind::Literal,
                    range: start..index,
                });
            }
            continue;
        }

        // Multi-byte characters are copied through whole.
        let width = input[index..].chars().next().map_or(1, char::len_utf8);
        push_other(&mut spans, index..index + width);
        index += width;
    }

    spans
}

/// Rewrites every literal of `base` in `input` to decimal text.
///
/// Negative bit patterns are parenthesized so they keep binding as one operand.
pub fn rewrite(input: &str, base: Base) -> Result<String, ConversionError> {
    let read_literal: fn(&str) -> Result<i32, ConversionError> = match base {
        Base::Decimal => return Ok(input.to_owned()),
        Base::Binary => |text: &str| {
            if text.contains('.') {
                return Err(ConversionError::NonIntegral(text.to_owned()));
            }
            binary_to_decimal(text)
        },
        Base::Hex => |text: &str| hex_to_decimal(&text[2..]),
    };
    let mut output = String::with_capacity(input.len());

    for span in scan(input, base) {
        let text = &input[span.range.clone()];
        match span.kind {
            SpanKind::Other => output.push_str(text),
            SpanKind::Literal => {
                let value = read_literal(text)?;
                trace!(literal = text, value, "rewrote literal");
                if value < 0 {
                    output.push_str(&format!("({})", value));
                } else {
                    output.push_str(&value.to_string());
                }
            }
        }
    }

    Ok(output)
}
