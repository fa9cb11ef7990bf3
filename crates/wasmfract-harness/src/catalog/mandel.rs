//! Mandelbrot membership shortcuts and escape-time iteration.

use wasmfract_core::FixtureCatalog;
use wasmfract_core::datatype::{
    FOUR_F64_ONE_I32_IN_ONE_I32_OUT, TWO_F64_IN_ONE_I32_OUT, TWO_F64_ONE_I32_IN_ONE_I32_OUT,
};

use super::descriptor;

/// Vectors for the `mandel` library.
#[must_use]
pub fn catalog() -> FixtureCatalog {
    [
        descriptor(
            "is_in_period_2_bulb",
            TWO_F64_IN_ONE_I32_OUT,
            "Point lies within the Mandelbrot set's period 2 bulb",
            &[
                (&[-1.25, 0.0], &[1.0]),
                (&[-0.749_999_9, 0.0], &[0.0]),
                (&[-0.75, 0.0], &[1.0]),
                (&[-1.250_000_1, 0.0], &[0.0]),
                (&[-1.0025, 0.249_98], &[1.0]),
                (&[-1.0025, 0.25], &[0.0]),
            ],
        ),
        descriptor(
            "is_in_main_cardioid",
            TWO_F64_IN_ONE_I32_OUT,
            "Point lies within the Mandelbrot set's main cardioid",
            &[
                (&[0.0, 0.0], &[1.0]),
                (&[0.25, 0.0], &[1.0]),
                (&[0.250_000_1, 0.0], &[0.0]),
                (&[1.0, 0.0], &[0.0]),
                (&[-1.0, 0.0], &[0.0]),
                (&[-0.135, 0.75], &[0.0]),
                (&[-0.75, 0.0], &[1.0]),
                (&[0.0, 1.0], &[0.0]),
                (&[0.0, -1.0], &[0.0]),
            ],
        ),
        descriptor(
            "mandel_early_bailout",
            TWO_F64_IN_ONE_I32_OUT,
            "Can we bail out of the Mandelbrot escape time algorithm early?",
            &[
                (&[-1.25, 0.0], &[1.0]),
                (&[-0.749_999_9, 0.0], &[1.0]),
                (&[-0.75, 0.0], &[1.0]),
                (&[-1.250_000_1, 0.0], &[0.0]),
                (&[-1.0025, 0.249_98], &[1.0]),
                (&[-1.0025, 0.25], &[0.0]),
                (&[0.0, 0.0], &[1.0]),
                (&[0.25, 0.0], &[1.0]),
                (&[0.250_000_1, 0.0], &[0.0]),
                (&[1.0, 0.0], &[0.0]),
                (&[-1.0, 0.0], &[1.0]),
                (&[-0.135, 0.75], &[0.0]),
                (&[-0.75, 0.0], &[1.0]),
                (&[0.0, 1.0], &[0.0]),
                (&[0.0, -1.0], &[0.0]),
            ],
        ),
        descriptor(
            "escape_time_mj",
            FOUR_F64_ONE_I32_IN_ONE_I32_OUT,
            "Escape time algorithm for calculating both the Mandelbrot set and Julia sets",
            &[
                (&[0.0, 0.0, 0.0, 0.0, 100.0], &[100.0]),
                (&[-2.0, 0.0, 0.0, 0.0, 100.0], &[100.0]),
                (&[0.675, 0.0, 0.0, 0.0, 100.0], &[4.0]),
                (&[1.0, 0.0, 0.0, 0.0, 100.0], &[3.0]),
                (&[2.0, 0.0, 0.0, 0.0, 100.0], &[2.0]),
                (&[2.000_01, 0.0, 0.0, 0.0, 100.0], &[1.0]),
            ],
        ),
        descriptor(
            "mandel_iter",
            TWO_F64_ONE_I32_IN_ONE_I32_OUT,
            "Return the iteration count of one pixel on the Mandelbrot set",
            &[
                (&[0.0, 0.0, 100.0], &[100.0]),
                (&[-2.0, 0.0, 100.0], &[100.0]),
                (&[0.675, 0.0, 100.0], &[4.0]),
                (&[1.0, 0.0, 100.0], &[3.0]),
                (&[2.0, 0.0, 100.0], &[2.0]),
                (&[2.000_01, 0.0, 100.0], &[1.0]),
            ],
        ),
    ]
    .into_iter()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_bound_is_last_input() {
        let catalog = catalog();
        assert!(catalog.format_issues().is_empty());
        let iter = catalog.get("mandel_iter").unwrap();
        assert!(iter.vectors.iter().all(|v| v.when_passed[2] == 100.0));
    }
}
