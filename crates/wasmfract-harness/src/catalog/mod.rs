//! Built-in fixture catalogs, addressable by name.

pub mod colour;
pub mod complex;
pub mod mandel;

use wasmfract_core::{FixtureCatalog, FunctionTestDescriptor, InterfaceSignature, TestVector};

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: [&str; 3] = ["colour", "complex", "mandel"];

/// Look up a built-in catalog.
#[must_use]
pub fn builtin(name: &str) -> Option<FixtureCatalog> {
    match name {
        "colour" => Some(colour::catalog()),
        "complex" => Some(complex::catalog()),
        "mandel" => Some(mandel::catalog()),
        _ => None,
    }
}

pub(crate) fn descriptor(
    name: &str,
    signature: InterfaceSignature,
    description: &str,
    vectors: &[(&[f64], &[f64])],
) -> FunctionTestDescriptor {
    FunctionTestDescriptor::new(name, signature, description).with_vectors(
        vectors
            .iter()
            .map(|(input, output)| TestVector::new(input, output))
            .collect(),
    )
}
