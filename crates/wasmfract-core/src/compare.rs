//! Tolerance-aware comparison of output vectors.
//!
//! Each element is first checked for exact equality. Only when that fails is
//! the datatype's tolerance consulted, so integer and boolean-coded results
//! never go through floating-point slack. Text values (formatted outputs)
//! only ever match exactly.

use serde::{Deserialize, Serialize};

use crate::datatype::Datatype;
use crate::value::Value;

/// Per-element classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementResult {
    pub equal: bool,
    pub within_tolerance: bool,
}

impl ElementResult {
    const EXACT: Self = Self {
        equal: true,
        within_tolerance: false,
    };

    #[must_use]
    pub fn accepted(&self) -> bool {
        self.equal || self.within_tolerance
    }
}

/// Result of comparing an actual vector with an expected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub comparable: bool,
    pub elements: Vec<ElementResult>,
}

/// Overall judgement of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    PassWithinTolerance,
    Fail,
    Incomparable,
}

impl Verdict {
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Pass | Self::PassWithinTolerance)
    }

    /// Message prefix used in outcome diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::PassWithinTolerance => "PASS (within tolerance)",
            Self::Fail => "FAIL",
            Self::Incomparable => "FAIL: Arrays of differing length or type are not comparable",
        }
    }
}

impl Comparison {
    fn incomparable() -> Self {
        Self {
            comparable: false,
            elements: Vec::new(),
        }
    }

    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if !self.comparable {
            return Verdict::Incomparable;
        }
        if !self.elements.iter().all(ElementResult::accepted) {
            return Verdict::Fail;
        }
        if self.elements.iter().any(|el| el.within_tolerance) {
            Verdict::PassWithinTolerance
        } else {
            Verdict::Pass
        }
    }
}

/// `expected - tolerance <= actual <= expected + tolerance`.
#[must_use]
pub fn close_enough(tolerance: f64, actual: f64, expected: f64) -> bool {
    expected + tolerance >= actual && expected - tolerance <= actual
}

fn within_tolerance(datatype: Option<&Datatype>, actual: &Value, expected: &Value) -> bool {
    match (datatype, actual, expected) {
        (Some(dt), Value::Number(a), Value::Number(e)) if dt.has_tolerance() => {
            close_enough(dt.tolerance(), *a, *e)
        }
        _ => false,
    }
}

/// Compare `actual` against `expected` using the output types of a signature.
///
/// Never panics. Vectors of different length are reported as not comparable.
/// Positions beyond the end of `types` fall back to exact matching.
#[must_use]
pub fn compare(types: &[Datatype], actual: &[Value], expected: &[Value]) -> Comparison {
    if actual.len() != expected.len() {
        return Comparison::incomparable();
    }

    let elements = actual
        .iter()
        .zip(expected)
        .enumerate()
        .map(|(idx, (a, e))| {
            if a == e {
                ElementResult::EXACT
            } else {
                ElementResult {
                    equal: false,
                    within_tolerance: within_tolerance(types.get(idx), a, e),
                }
            }
        })
        .collect();

    Comparison {
        comparable: true,
        elements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::{F64, I32};

    fn nums(values: &[f64]) -> Vec<Value> {
        values.iter().copied().map(Value::Number).collect()
    }

    #[test]
    fn length_mismatch_is_incomparable() {
        let cmp = compare(&[F64, F64, F64], &nums(&[1.0, 2.0]), &nums(&[1.0, 2.0, 3.0]));
        assert!(!cmp.comparable);
        assert!(cmp.elements.is_empty());
        assert_eq!(cmp.verdict(), Verdict::Incomparable);
    }

    #[test]
    fn empty_vectors_pass() {
        let cmp = compare(&[], &[], &[]);
        assert!(cmp.comparable);
        assert_eq!(cmp.verdict(), Verdict::Pass);
    }

    #[test]
    fn exact_match_is_classified_equal_first() {
        let cmp = compare(&[F64], &nums(&[0.25]), &nums(&[0.25]));
        assert_eq!(cmp.elements, vec![ElementResult::EXACT]);
        assert_eq!(cmp.verdict(), Verdict::Pass);
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let t = F64.tolerance();
        let expected = 1.0;
        let cmp = compare(&[F64], &nums(&[expected + t]), &nums(&[expected]));
        assert_eq!(cmp.verdict(), Verdict::PassWithinTolerance);
        assert!(!cmp.elements[0].equal);
        assert!(cmp.elements[0].within_tolerance);
    }

    #[test]
    fn beyond_tolerance_fails() {
        let t = F64.tolerance();
        let cmp = compare(&[F64], &nums(&[1.0 + t + 1e-9]), &nums(&[1.0]));
        assert_eq!(cmp.verdict(), Verdict::Fail);
    }

    #[test]
    fn integer_kind_degrades_to_exact() {
        let cmp = compare(&[I32], &nums(&[3.0]), &nums(&[4.0]));
        assert_eq!(cmp.verdict(), Verdict::Fail);

        let tiny = compare(&[I32], &nums(&[1.0 + 1e-17]), &nums(&[1.0]));
        // 1.0 + 1e-17 rounds to 1.0, which is an exact match.
        assert_eq!(tiny.verdict(), Verdict::Pass);
    }

    #[test]
    fn text_values_never_use_tolerance() {
        let a = vec![Value::Text("0xff000000".into())];
        let e = vec![Value::Text("0xff000001".into())];
        assert_eq!(compare(&[F64], &a, &e).verdict(), Verdict::Fail);
    }

    #[test]
    fn missing_type_positions_fall_back_to_exact() {
        let t = F64.tolerance();
        let cmp = compare(&[F64], &nums(&[1.0, 2.0 + t]), &nums(&[1.0, 2.0]));
        assert!(cmp.comparable);
        assert_eq!(cmp.verdict(), Verdict::Fail);
    }

    #[test]
    fn nan_never_passes() {
        let cmp = compare(&[F64], &nums(&[f64::NAN]), &nums(&[f64::NAN]));
        assert_eq!(cmp.verdict(), Verdict::Fail);
    }

    #[test]
    fn mixed_elements_annotate_tolerance() {
        let t = F64.tolerance();
        let cmp = compare(&[F64, F64], &nums(&[7.0, 4.0 - t]), &nums(&[7.0, 4.0]));
        assert_eq!(cmp.verdict(), Verdict::PassWithinTolerance);
        assert_eq!(cmp.verdict().label(), "PASS (within tolerance)");
    }
}
