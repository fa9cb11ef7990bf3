//! Wire-level numeric datatypes and function interface signatures.
//!
//! A [`Datatype`] pairs a wasm value label with the absolute tolerance used when
//! judging two results of that type "close enough". The catalog is fixed:
//! [`F64`], [`F32`], [`I32`], [`I64`]. Integer kinds carry tolerance 0, which
//! degrades comparison to exact match.

use std::borrow::Cow;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// A tagged numeric kind with its equality tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datatype {
    label: &'static str,
    tolerance: f64,
}

// Roughly two ulps at 1.0.
pub const F64: Datatype = Datatype::new("f64", 0.000_000_000_000_000_5);
pub const F32: Datatype = Datatype::new("f32", 0.000_000_000_000_000_5);
pub const I32: Datatype = Datatype::new("i32", 0.0);
pub const I64: Datatype = Datatype::new("i64", 0.0);

/// Every datatype known to the harness.
pub const CATALOG: [Datatype; 4] = [F64, F32, I32, I64];

impl Datatype {
    const fn new(label: &'static str, tolerance: f64) -> Self {
        Self { label, tolerance }
    }

    /// Wire label (`f64`, `f32`, `i32`, `i64`).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Maximum admissible absolute deviation.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Whether this datatype admits anything other than an exact match.
    #[must_use]
    pub fn has_tolerance(&self) -> bool {
        self.tolerance > 0.0
    }

    /// Look up a catalog entry by label, ignoring ASCII case.
    #[must_use]
    pub fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        CATALOG
            .iter()
            .copied()
            .find(|dt| dt.label.eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

impl Serialize for Datatype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label)
    }
}

impl<'de> Deserialize<'de> for Datatype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::from_label(&label).ok_or_else(|| {
            de::Error::unknown_variant(&label, &["f64", "f32", "i32", "i64"])
        })
    }
}

/// Ordered input and output datatypes of one hosted function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSignature {
    pub input: Cow<'static, [Datatype]>,
    pub output: Cow<'static, [Datatype]>,
}

impl InterfaceSignature {
    /// Build a signature from owned type lists.
    #[must_use]
    pub fn new(input: Vec<Datatype>, output: Vec<Datatype>) -> Self {
        Self {
            input: Cow::Owned(input),
            output: Cow::Owned(output),
        }
    }

    #[must_use]
    pub fn input_arity(&self) -> usize {
        self.input.len()
    }

    #[must_use]
    pub fn output_arity(&self) -> usize {
        self.output.len()
    }

    /// A function declaring one output returns a bare scalar at the host boundary.
    #[must_use]
    pub fn is_scalar_output(&self) -> bool {
        self.output.len() == 1
    }
}

impl fmt::Display for InterfaceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_list(f, &self.input)?;
        f.write_str(" -> ")?;
        write_type_list(f, &self.output)
    }
}

fn write_type_list(f: &mut fmt::Formatter<'_>, types: &[Datatype]) -> fmt::Result {
    f.write_str("(")?;
    for (i, dt) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(dt.label)?;
    }
    f.write_str(")")
}

const fn signature(
    input: &'static [Datatype],
    output: &'static [Datatype],
) -> InterfaceSignature {
    InterfaceSignature {
        input: Cow::Borrowed(input),
        output: Cow::Borrowed(output),
    }
}

pub const TWO_F64_IN_ONE_F64_OUT: InterfaceSignature = signature(&[F64, F64], &[F64]);
pub const TWO_F64_IN_ONE_I32_OUT: InterfaceSignature = signature(&[F64, F64], &[I32]);
pub const TWO_F64_ONE_I32_IN_ONE_I32_OUT: InterfaceSignature =
    signature(&[F64, F64, I32], &[I32]);
pub const TWO_F64_IN_TWO_F64_OUT: InterfaceSignature = signature(&[F64, F64], &[F64, F64]);
pub const FOUR_F64_IN_TWO_F64_OUT: InterfaceSignature =
    signature(&[F64, F64, F64, F64], &[F64, F64]);
pub const FOUR_F64_ONE_I32_IN_ONE_I32_OUT: InterfaceSignature =
    signature(&[F64, F64, F64, F64, I32], &[I32]);
pub const FOUR_I32_IN_ONE_I32_OUT: InterfaceSignature = signature(&[I32, I32, I32, I32], &[I32]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_kinds_require_exact_match() {
        assert!(!I32.has_tolerance());
        assert!(!I64.has_tolerance());
        assert!(F64.has_tolerance());
        assert!(F32.has_tolerance());
    }

    #[test]
    fn lookup_by_label_is_case_insensitive() {
        assert_eq!(Datatype::from_label("F64"), Some(F64));
        assert_eq!(Datatype::from_label(" i32 "), Some(I32));
        assert_eq!(Datatype::from_label("v128"), None);
    }

    #[test]
    fn datatype_serializes_as_label() {
        let json = serde_json::to_string(&FOUR_F64_IN_TWO_F64_OUT).unwrap();
        assert_eq!(json, r#"{"input":["f64","f64","f64","f64"],"output":["f64","f64"]}"#);

        let parsed: InterfaceSignature = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, FOUR_F64_IN_TWO_F64_OUT);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = serde_json::from_str::<Datatype>(r#""u8""#).unwrap_err();
        assert!(err.to_string().contains("u8"));
    }

    #[test]
    fn signature_display() {
        assert_eq!(TWO_F64_IN_ONE_I32_OUT.to_string(), "(f64, f64) -> (i32)");
        assert!(TWO_F64_IN_ONE_F64_OUT.is_scalar_output());
        assert!(!TWO_F64_IN_TWO_F64_OUT.is_scalar_output());
    }
}
