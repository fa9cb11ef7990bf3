use wasmfract_core::datatype::FOUR_I32_IN_ONE_I32_OUT;
use wasmfract_core::{FixtureCatalog, Formatter, FunctionTestDescriptor, TestVector};

// Four i32 inputs and the packed 32-bit colour word they must produce.
const PIXEL_COLOUR: [([f64; 4], u32); 10] = [
    ([255.0, 0.0, 0.0, 255.0], 0xFFFF_0000),
    ([255.0, 0.0, 16.0, 255.0], 0xFFDF_2000),
    ([255.0, 0.0, 32.0, 255.0], 0xFFBF_4000),
    ([255.0, 0.0, 64.0, 255.0], 0xFF7E_8100),
    ([255.0, 0.0, 96.0, 255.0], 0xFF3E_C100),
    ([255.0, 0.0, 128.0, 255.0], 0xFF01_0001),
    ([255.0, 0.0, 160.0, 255.0], 0xFF01_4041),
    ([255.0, 0.0, 192.0, 255.0], 0xFF01_8081),
    ([255.0, 0.0, 224.0, 255.0], 0xFF01_C0C1),
    ([255.0, 0.0, 255.0, 255.0], 0xFF01_FEFF),
];

/// Vectors for the `colour` library. Results are packed words, compared as hex.
#[must_use]
pub fn catalog() -> FixtureCatalog {
    let vectors = PIXEL_COLOUR
        .iter()
        .map(|(rgba, word)| {
            TestVector::new(rgba, &[f64::from(*word)]).formatted(Formatter::Hex)
        })
        .collect();

    FixtureCatalog::new().with(
        FunctionTestDescriptor::new(
            "pixel_colour",
            FOUR_I32_IN_ONE_I32_OUT,
            "Value varies stepwise through range from 0 to 255",
        )
        .with_vectors(vectors),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmfract_core::Value;

    #[test]
    fn expected_words_render_as_hex() {
        let catalog = catalog();
        let desc = catalog.get("pixel_colour").unwrap();
        assert_eq!(desc.vectors.len(), 10);
        let first = &desc.vectors[0];
        assert_eq!(
            first.formatter.apply_all(&first.should_get),
            vec![Value::Text("0xffff0000".into())]
        );
    }
}
