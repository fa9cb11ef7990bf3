//! End-to-end executor scenarios against closure-backed modules.

use wasmfract_core::compare::Verdict;
use wasmfract_core::datatype::{F64, FOUR_F64_IN_TWO_F64_OUT, FOUR_I32_IN_ONE_I32_OUT, I32, TWO_F64_IN_TWO_F64_OUT};
use wasmfract_core::{
    ClosureExports, FixtureCatalog, Formatter, FunctionTestDescriptor, TestRunner, TestVector,
    Value, compare,
};

fn complex_add() -> ClosureExports {
    ClosureExports::new().with("add", |a| Ok(vec![a[0] + a[2], a[1] + a[3]]))
}

#[test]
fn misdeclared_vector_is_incomparable() {
    // Two outputs declared, one expected value supplied.
    let catalog = FixtureCatalog::new().with(
        FunctionTestDescriptor::new("add", TWO_F64_IN_TWO_F64_OUT, "Complex sum")
            .with_vectors(vec![TestVector::new(&[5.0, 3.0], &[8.0])]),
    );
    let mut module = ClosureExports::new().with("add", |a| Ok(vec![a[0] + a[1], 0.0]));

    assert!(!catalog.format_issues().is_empty());

    let report = TestRunner::new("e2e", "complex").run(&mut module, &catalog);
    assert_eq!((report.passed, report.failed, report.missing), (0, 1, 0));
    assert_eq!(report.entries[0].outcomes[0].verdict, Verdict::Incomparable);
}

#[test]
fn correct_four_input_sum_passes() {
    let catalog = FixtureCatalog::new().with(
        FunctionTestDescriptor::new("add", FOUR_F64_IN_TWO_F64_OUT, "Complex sum")
            .with_vectors(vec![TestVector::new(&[5.0, 2.0, 2.0, 2.0], &[7.0, 4.0])]),
    );
    let report = TestRunner::new("e2e", "complex").run(&mut complex_add(), &catalog);
    assert_eq!((report.passed, report.failed), (1, 0));
    assert!(report.all_passed());
    assert_eq!(
        report.entries[0].outcomes[0].message,
        "PASS: add(5,2,2,2) => [7,4], expected [7,4]"
    );
}

#[test]
fn reruns_are_deterministic() {
    let catalog = FixtureCatalog::new().with(
        FunctionTestDescriptor::new("add", FOUR_F64_IN_TWO_F64_OUT, "Complex sum").with_vectors(
            vec![
                TestVector::new(&[5.0, 2.0, 2.0, 2.0], &[7.0, 4.0]),
                TestVector::new(&[0.1, 0.2, 0.2, 0.1], &[0.3, 0.3]),
                TestVector::new(&[1.0, 1.0, 1.0, 1.0], &[3.0, 2.0]),
            ],
        ),
    );
    let runner = TestRunner::new("e2e", "complex");
    let first = runner.run(&mut complex_add(), &catalog);
    let second = runner.run(&mut complex_add(), &catalog);
    assert_eq!(first, second);
    assert_eq!(first.total(), 3);
}

#[test]
fn hex_formatter_compares_packed_colours() {
    let catalog = FixtureCatalog::new().with(
        FunctionTestDescriptor::new("pixel_colour", FOUR_I32_IN_ONE_I32_OUT, "RGBA").with_vectors(
            vec![TestVector::new(&[255.0, 0.0, 0.0, 255.0], &[4_294_901_760.0]).formatted(Formatter::Hex)],
        ),
    );
    // The hosted function hands back the signed view of 0xFFFF0000.
    let mut module = ClosureExports::new().with("pixel_colour", |_| Ok(vec![-65536.0]));
    let report = TestRunner::new("e2e", "colour").run(&mut module, &catalog);
    assert!(report.all_passed(), "{report:?}");
    assert_eq!(
        report.entries[0].outcomes[0].message,
        "PASS: pixel_colour(255,0,0,255) => [0xffff0000], expected [0xffff0000]"
    );
}

#[test]
fn formatting_preserves_exact_equality() {
    for raw in [0.0, 1.0, -1.0, 255.0, -65536.0, 2_147_483_647.0] {
        for formatter in [Formatter::None, Formatter::Hex, Formatter::Boolean] {
            let a = formatter.apply_all(&[raw]);
            let e = formatter.apply_all(&[raw]);
            assert_eq!(compare(&[I32], &a, &e).verdict(), Verdict::Pass);
        }
    }
}

#[test]
fn comparator_is_total_over_shapes() {
    let shapes: Vec<Vec<Value>> = vec![
        vec![],
        vec![Value::Number(1.0)],
        vec![Value::Number(1.0), Value::Text("x".into())],
        vec![Value::Number(f64::NAN), Value::Number(f64::INFINITY), Value::Number(0.0)],
    ];
    for a in &shapes {
        for b in &shapes {
            let cmp = compare(&[F64, F64], a, b);
            if a.len() == b.len() {
                assert!(cmp.comparable);
                assert_eq!(cmp.elements.len(), a.len());
            } else {
                assert!(!cmp.comparable);
                assert!(cmp.elements.is_empty());
            }
        }
    }
}
