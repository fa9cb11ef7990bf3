//! Host-side result values and output formatters.
//!
//! Hosted functions hand back plain numbers. Some of those numbers are packed
//! encodings (an RGBA colour, a boolean flag), so a [`Formatter`] can turn them
//! into text before comparison. The same formatter is always applied to both
//! the actual and the expected side.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One element of an actual or expected output vector.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Render a number the way diagnostic messages expect: shortest round-trip
/// digits, integers without a trailing `.0`, and exponent notation below
/// `1e-6` or from `1e21` upwards (`1e-7`, `1.5e+21`).
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return String::from("NaN");
    }
    if n.is_infinite() {
        return String::from(if n > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if n == 0.0 {
        return String::from("0");
    }

    let sign = if n < 0.0 { "-" } else { "" };
    // `{:e}` yields the shortest round-trip mantissa, e.g. `1.2345e-7`.
    let sci = format!("{:e}", n.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    // Decimal point position relative to the start of `digits`.
    let point = exp.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let e = point - 1;
        let exp_sign = if e < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{exp_sign}{}", e.abs())
        } else {
            format!("{lead}.{rest}e{exp_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}

/// Comma-join a sequence of displayable values (no spaces).
#[must_use]
pub fn join_values<T: fmt::Display>(values: &[T]) -> String {
    let mut out = String::new();
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out
}

/// Output reinterpretation applied before comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Formatter {
    #[default]
    None,
    /// 32-bit word rendered as `0x` plus eight lowercase hex digits.
    Hex,
    /// Non-zero is `"true"`, zero is `"false"`.
    Boolean,
}

impl Formatter {
    /// Apply this formatter to a single number.
    #[must_use]
    pub fn apply(self, n: f64) -> Value {
        match self {
            Self::None => Value::Number(n),
            Self::Hex => Value::Text(hex_word(n)),
            Self::Boolean => Value::Text(String::from(if n != 0.0 { "true" } else { "false" })),
        }
    }

    /// Apply this formatter to every element of an output vector.
    #[must_use]
    pub fn apply_all(self, values: &[f64]) -> Vec<Value> {
        values.iter().map(|&n| self.apply(n)).collect()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hex => "hex",
            Self::Boolean => "boolean",
        }
    }
}

/// Reinterpret the low 32 bits of an integer-valued number as an unsigned word.
///
/// Signed i32 results (`-65536`) and unsigned literals (`0xFFFF0000`) land on
/// the same bit pattern, so both render identically.
#[must_use]
pub fn hex_word(n: f64) -> String {
    // The word is printed as-is; no byte reordering.
    format!("0x{:08x}", (n as i64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.9272952180016122), "0.9272952180016122");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn extreme_magnitudes_switch_to_exponent_form() {
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(-2.5e-9), "-2.5e-9");
        assert_eq!(format_number(0.000_001), "0.000001");
        assert_eq!(format_number(0.000_123), "0.000123");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e300), "1.5e+300");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(123.456), "123.456");
        assert_eq!(format_number(5e-324), "5e-324");
    }

    #[test]
    fn join_matches_array_to_string() {
        let vals = [Value::Number(7.0), Value::Number(-4.0)];
        assert_eq!(join_values(&vals), "7,-4");
        assert_eq!(join_values::<Value>(&[]), "");
    }

    #[test]
    fn hex_reinterprets_signed_and_unsigned_alike() {
        assert_eq!(hex_word(-65536.0), "0xffff0000");
        assert_eq!(hex_word(4_294_901_760.0), "0xffff0000");
        assert_eq!(hex_word(255.0), "0x000000ff");
        assert_eq!(hex_word(0.0), "0x00000000");
    }

    #[test]
    fn hex_keeps_word_byte_order() {
        assert_eq!(hex_word(f64::from(0x1234_5678)), "0x12345678");
        assert_eq!(hex_word(f64::from(0xFF01_FEFF_u32)), "0xff01feff");
    }

    #[test]
    fn boolean_formatter() {
        assert_eq!(Formatter::Boolean.apply(1.0), Value::Text("true".into()));
        assert_eq!(Formatter::Boolean.apply(-7.0), Value::Text("true".into()));
        assert_eq!(Formatter::Boolean.apply(0.0), Value::Text("false".into()));
    }

    #[test]
    fn none_formatter_passes_numbers_through() {
        assert_eq!(Formatter::None.apply_all(&[1.5, 2.0]), vec![Value::Number(1.5), Value::Number(2.0)]);
    }

    #[test]
    fn formatter_tag_serde() {
        assert_eq!(serde_json::to_string(&Formatter::Hex).unwrap(), r#""hex""#);
        let parsed: Formatter = serde_json::from_str(r#""boolean""#).unwrap();
        assert_eq!(parsed, Formatter::Boolean);
        assert!(serde_json::from_str::<Formatter>(r#""octal""#).is_err());
    }
}
