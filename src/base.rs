use crate::error::ConversionError;
use az::WrappingAs;
use std::fmt;
use std::num::IntErrorKind;

/// Numeral base governing literal interpretation and result display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Base {
    #[default]
    Decimal,
    Binary,
    Hex,
}

impl Base {
    pub fn radix(self) -> u32 {
        match self {
            Base::Decimal => 10,
            Base::Binary => 2,
            Base::Hex => 16,
        }
    }

    pub fn from_radix(radix: u32) -> Option<Base> {
        match radix {
            10 => Some(Base::Decimal),
            2 => Some(Base::Binary),
            16 => Some(Base::Hex),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Base::Decimal => "Decimal",
            Base::Binary => "Binary",
            Base::Hex => "Hexadecimal",
        }
    }

    /// Three letter indicator shown next to the display.
    pub fn label(self) -> &'static str {
        match self {
            Base::Decimal => "DEC",
            Base::Binary => "BIN",
            Base::Hex => "HEX",
        }
    }

    /// Reads a bare literal of this base. Hex input may carry a `0x` prefix.
    pub fn parse_literal(self, text: &str) -> Result<i32, ConversionError> {
        let text = text.trim();
        match self {
            Base::Decimal => parse_decimal(text),
            Base::Binary => binary_to_decimal(text),
            Base::Hex => {
                let digits = text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                    .unwrap_or(text);
                hex_to_decimal(digits)
            }
        }
    }

    /// Writes `value` as a bare literal of this base (no prefix).
    pub fn format_literal(self, value: i32) -> String {
        match self {
            Base::Decimal => value.to_string(),
            Base::Binary => decimal_to_binary(value),
            Base::Hex => decimal_to_hex(value),
        }
    }

    /// Writes `value` the way results are displayed: hex results get `0x`.
    pub fn format_result(self, value: i32) -> String {
        match self {
            Base::Hex => format!("0x{}", decimal_to_hex(value)),
            _ => self.format_literal(value),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a literal between bases.
///
/// `Ok(None)` means the pair is a no-op (same base on both sides). Every other
/// pair reads the text in `from` and writes it in `to`, so the table is
/// symmetric by construction.
pub fn convert(from: Base, to: Base, text: &str) -> Result<Option<String>, ConversionError> {
    match (from, to) {
        (Base::Decimal, Base::Decimal) | (Base::Binary, Base::Binary) | (Base::Hex, Base::Hex) => {
            Ok(None)
        }
        (Base::Decimal, Base::Binary)
        | (Base::Decimal, Base::Hex)
        | (Base::Binary, Base::Decimal)
        | (Base::Binary, Base::Hex)
        | (Base::Hex, Base::Decimal)
        | (Base::Hex, Base::Binary) => {
            let value = from.parse_literal(text)?;
            Ok(Some(to.format_literal(value)))
        }
    }
}

/// Base-2 digits of the 32-bit two's complement pattern.
pub fn decimal_to_binary(value: i32) -> String {
    format!("{:b}", value.wrapping_as::<u32>())
}

/// Lowercase hex digits of the 32-bit two's complement pattern, no prefix.
pub fn decimal_to_hex(value: i32) -> String {
    format!("{:x}", value.wrapping_as::<u32>())
}

/// Parses up to 32 binary digits into the bit pattern of an `i32`. Empty is 0.
pub fn binary_to_decimal(text: &str) -> Result<i32, ConversionError> {
    if text.is_empty() {
        return Ok(0);
    }
    parse_bits(text, Base::Binary)
}

/// Parses up to 8 significant hex digits (no prefix) into the bit pattern of an `i32`.
pub fn hex_to_decimal(text: &str) -> Result<i32, ConversionError> {
    parse_bits(text.trim(), Base::Hex)
}

fn parse_bits(text: &str, base: Base) -> Result<i32, ConversionError> {
    let radix = base.radix();
    if text.is_empty() || !text.chars().all(|c| c.is_digit(radix)) {
        return Err(ConversionError::InvalidLiteral {
            text: text.to_owned(),
            base: base.name(),
        });
    }
    match u32::from_str_radix(text, radix) {
        Ok(bits) => Ok(bits.wrapping_as::<i32>()),
        Err(_) => Err(ConversionError::OutOfRange(text.to_owned())),
    }
}

/// Parses decimal text as an `i32`, telling fractions and overflow apart.
pub fn parse_decimal(text: &str) -> Result<i32, ConversionError> {
    let text = text.trim();
    match text.parse::<i32>() {
        Ok(value) => Ok(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                Err(ConversionError::OutOfRange(text.to_owned()))
            }
            _ => match text.parse::<f64>() {
                Ok(value) if value.is_finite() && value.fract() != 0.0 => {
                    Err(ConversionError::NonIntegral(text.to_owned()))
                }
                Ok(value) if value > i32::MAX as f64 || value < i32::MIN as f64 => {
                    Err(ConversionError::OutOfRange(text.to_owned()))
                }
                _ => Err(ConversionError::InvalidLiteral {
                    text: text.to_owned(),
                    base: Base::Decimal.name(),
                }),
            },
        },
    }
}
