//! Complex arithmetic, transcendental and hyperbolic functions.

use wasmfract_core::FixtureCatalog;
use wasmfract_core::datatype::{FOUR_F64_IN_TWO_F64_OUT, TWO_F64_IN_ONE_F64_OUT, TWO_F64_IN_TWO_F64_OUT};

use super::descriptor;

const ARG_3_4: f64 = 0.927_295_218_001_612_2;

/// Vectors for the `complex` library.
#[must_use]
pub fn catalog() -> FixtureCatalog {
    [
        descriptor("real", TWO_F64_IN_ONE_F64_OUT, "Real part", &[(&[5.0, 2.0], &[5.0])]),
        descriptor("imag", TWO_F64_IN_ONE_F64_OUT, "Imaginary part", &[(&[5.0, 2.0], &[2.0])]),
        descriptor("hypot", TWO_F64_IN_ONE_F64_OUT, "Hypotenuse length", &[(&[3.0, 4.0], &[5.0])]),
        descriptor("arg", TWO_F64_IN_ONE_F64_OUT, "Argument", &[(&[3.0, 4.0], &[ARG_3_4])]),
        descriptor("conj", TWO_F64_IN_TWO_F64_OUT, "Conjugate", &[(&[7.0, 4.0], &[7.0, -4.0])]),
        descriptor("norm_sqr", TWO_F64_IN_ONE_F64_OUT, "Normal square", &[(&[7.0, 4.0], &[65.0])]),
        descriptor(
            "inv",
            TWO_F64_IN_TWO_F64_OUT,
            "Inverse",
            &[(&[7.0, 4.0], &[7.0 / 65.0, -4.0 / 65.0])],
        ),
        descriptor(
            "to_polar",
            TWO_F64_IN_TWO_F64_OUT,
            "Convert to polar coordinates",
            &[(&[3.0, 4.0], &[5.0, ARG_3_4])],
        ),
        descriptor(
            "to_rect",
            TWO_F64_IN_TWO_F64_OUT,
            "Convert to rectangular coordinates",
            &[(&[5.0, ARG_3_4], &[3.0, 4.0])],
        ),
        descriptor(
            "mul_by_conj",
            TWO_F64_IN_ONE_F64_OUT,
            "Multiply a complex number by its own conjugate",
            &[(&[7.0, 4.0], &[65.0])],
        ),
        descriptor(
            "mul_by_i",
            TWO_F64_IN_TWO_F64_OUT,
            "Multiply a complex number by i",
            &[(&[-5.0, -2.0], &[2.0, -5.0])],
        ),
        descriptor("sqr", TWO_F64_IN_TWO_F64_OUT, "Square a complex number", &[(&[5.0, 2.0], &[21.0, 20.0])]),
        descriptor("taxi", TWO_F64_IN_ONE_F64_OUT, "Taxi distance to origin", &[(&[5.0, 2.0], &[7.0])]),
        descriptor(
            "sqrt_1mz2",
            TWO_F64_IN_TWO_F64_OUT,
            "Square root of one minus the complex number squared",
            &[(&[5.0, 2.0], &[2.035_223_728_176_082_3, -4.913_464_727_026_231])],
        ),
        descriptor(
            "sqrt_1pz2",
            TWO_F64_IN_TWO_F64_OUT,
            "Square root of one plus the complex number squared",
            &[(&[5.0, 2.0], &[5.085_869_517_331_181, 1.966_232_119_389_393_7])],
        ),
        descriptor(
            "sum_of_sqrs",
            TWO_F64_IN_ONE_F64_OUT,
            "Sum of squares",
            &[
                (&[5.0, 2.0], &[29.0]),
                (&[1.0, 1.0], &[2.0]),
                (&[-1.0, -1.0], &[2.0]),
                (&[0.5, 0.5], &[0.5]),
            ],
        ),
        descriptor(
            "diff_of_sqrs",
            TWO_F64_IN_ONE_F64_OUT,
            "Difference of squares",
            &[
                (&[5.0, 2.0], &[21.0]),
                (&[1.0, 1.0], &[0.0]),
                (&[-1.0, -1.0], &[0.0]),
                (&[0.5, 0.5], &[0.0]),
            ],
        ),
        descriptor(
            "ln",
            TWO_F64_IN_TWO_F64_OUT,
            "Natural logarithm",
            &[
                (&[5.0, 0.0], &[1.609_437_912_434_100_3, 0.0]),
                (&[-5.0, 0.0], &[1.609_437_912_434_100_3, -std::f64::consts::PI]),
                (&[0.0, 2.0], &[std::f64::consts::LN_2, std::f64::consts::FRAC_PI_2]),
                (&[0.0, -2.0], &[std::f64::consts::LN_2, -std::f64::consts::FRAC_PI_2]),
                (&[5.0, 2.0], &[1.683_647_914_993_236_8, 0.380_506_377_112_364_9]),
                (&[5.0, -2.0], &[1.683_647_914_993_236_8, -0.380_506_377_112_364_9]),
            ],
        ),
        descriptor(
            "sqrt",
            TWO_F64_IN_TWO_F64_OUT,
            "Principal value of square root",
            &[
                (&[0.0, 0.0], &[0.0, 0.0]),
                (&[5.0, 0.0], &[2.236_067_977_499_79, 0.0]),
                (&[-5.0, 0.0], &[0.0, 2.236_067_977_499_79]),
                (&[0.0, 2.0], &[1.0, 1.0]),
                (&[0.0, -2.0], &[1.0, -1.0]),
                (&[5.0, 2.0], &[2.278_723_854_170_85, 0.438_842_116_902_254_55]),
                (&[5.0, -2.0], &[2.278_723_854_170_85, -0.438_842_116_902_254_55]),
                (&[-5.0, 2.0], &[0.438_842_116_902_254_66, 2.278_723_854_170_85]),
                (&[-5.0, -2.0], &[0.438_842_116_902_254_66, -2.278_723_854_170_85]),
            ],
        ),
        descriptor(
            "add",
            FOUR_F64_IN_TWO_F64_OUT,
            "Add two complex numbers",
            &[
                (&[0.0, 0.0, 0.0, 0.0], &[0.0, 0.0]),
                (&[5.0, 0.0, 2.0, 0.0], &[7.0, 0.0]),
                (&[-5.0, 0.0, 2.0, 0.0], &[-3.0, 0.0]),
                (&[-5.0, 0.0, -2.0, 0.0], &[-7.0, 0.0]),
                (&[5.0, 3.0, 0.0, 0.0], &[5.0, 3.0]),
                (&[5.0, 3.0, 2.0, 0.0], &[7.0, 3.0]),
                (&[5.0, 3.0, 2.0, 2.0], &[7.0, 5.0]),
                (&[5.0, 3.0, -2.0, 0.0], &[3.0, 3.0]),
                (&[5.0, 3.0, 2.0, -2.0], &[7.0, 1.0]),
                (&[5.0, 3.0, -2.0, -2.0], &[3.0, 1.0]),
            ],
        ),
        descriptor(
            "sub",
            FOUR_F64_IN_TWO_F64_OUT,
            "Subtract two complex numbers",
            &[
                (&[0.0, 0.0, 0.0, 0.0], &[0.0, 0.0]),
                (&[5.0, 0.0, 2.0, 0.0], &[3.0, 0.0]),
                (&[-5.0, 0.0, 2.0, 0.0], &[-7.0, 0.0]),
                (&[-5.0, 0.0, -2.0, 0.0], &[-3.0, 0.0]),
                (&[5.0, 3.0, 0.0, 0.0], &[5.0, 3.0]),
                (&[5.0, 3.0, 2.0, 0.0], &[3.0, 3.0]),
                (&[5.0, 3.0, 2.0, 2.0], &[3.0, 1.0]),
                (&[5.0, 3.0, -2.0, 0.0], &[7.0, 3.0]),
                (&[5.0, 3.0, 2.0, -2.0], &[3.0, 5.0]),
                (&[5.0, 3.0, -2.0, -2.0], &[7.0, 5.0]),
            ],
        ),
        descriptor(
            "mul",
            FOUR_F64_IN_TWO_F64_OUT,
            "Multiply two complex numbers",
            &[
                (&[0.0, 0.0, 0.0, 0.0], &[0.0, 0.0]),
                (&[5.0, 0.0, 2.0, 0.0], &[10.0, 0.0]),
                (&[-5.0, 0.0, 2.0, 0.0], &[-10.0, 0.0]),
                (&[-5.0, 0.0, -2.0, 0.0], &[10.0, 0.0]),
                (&[5.0, 3.0, 0.0, 0.0], &[0.0, 0.0]),
                (&[5.0, 3.0, 2.0, 0.0], &[10.0, 6.0]),
                (&[5.0, 3.0, 2.0, 2.0], &[4.0, 16.0]),
                (&[5.0, 3.0, -2.0, 0.0], &[-10.0, -6.0]),
                (&[5.0, 3.0, 2.0, -2.0], &[16.0, -4.0]),
                (&[5.0, 3.0, -2.0, -2.0], &[-4.0, -16.0]),
            ],
        ),
        // Division by zero has no agreed result and is not probed.
        descriptor(
            "div",
            FOUR_F64_IN_TWO_F64_OUT,
            "Divide two complex numbers",
            &[
                (&[5.0, 0.0, 2.0, 0.0], &[2.5, 0.0]),
                (&[-5.0, 0.0, 2.0, 0.0], &[-2.5, 0.0]),
                (&[-5.0, 0.0, -2.0, 0.0], &[2.5, 0.0]),
                (&[5.0, 3.0, 2.0, 0.0], &[2.5, 1.5]),
                (&[5.0, 3.0, 2.0, 2.0], &[2.0, -0.5]),
                (&[5.0, 3.0, -2.0, 0.0], &[-2.5, -1.5]),
                (&[5.0, 3.0, 2.0, -2.0], &[0.5, 2.0]),
                (&[5.0, 3.0, -2.0, -2.0], &[-2.0, 0.5]),
            ],
        ),
        descriptor(
            "sin",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex sine",
            &[(&[5.0, 2.0], &[-3.607_660_774_213_156_3, 1.028_803_149_659_933_5])],
        ),
        descriptor(
            "asin",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex arcsine",
            &[(&[5.0, 2.0], &[1.184_231_684_275_018_5, 2.370_548_537_317_918_5])],
        ),
        descriptor(
            "sinh",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex hyperbolic sine",
            &[(&[5.0, 2.0], &[-30.879_431_343_588_244, 67.478_915_238_455_88])],
        ),
        descriptor(
            "asinh",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex hyperbolic arcsine",
            &[(
                &[-30.879_431_343_588_244, 67.478_915_238_455_88],
                &[-5.000_000_000_001_505, 1.141_592_653_589_953],
            )],
        ),
        descriptor(
            "cos",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex cosine",
            &[(&[5.0, 2.0], &[1.067_192_651_873_115_6, 3.477_884_485_899_157_3])],
        ),
        descriptor(
            "acos",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex arccosine",
            &[(&[5.0, 2.0], &[0.386_564_642_519_874_77, -2.370_548_537_317_92])],
        ),
        descriptor(
            "cosh",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex hyperbolic cosine",
            &[(&[5.0, 2.0], &[-30.882_235_318_916_74, 67.472_788_440_587_52])],
        ),
        descriptor(
            "acosh",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex hyperbolic arccosine",
            &[(&[-30.882_235_318_916_74, 67.472_788_440_587_52], &[5.0, 2.0])],
        ),
        descriptor(
            "tan",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex tangent",
            &[(&[5.0, 2.0], &[-0.020_553_016_568_255_644, 1.031_008_005_152_491_2])],
        ),
        descriptor(
            "atan",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex arctangent",
            &[(&[5.0, 2.0], &[1.399_284_356_584_545, 0.067_065_996_648_669_97])],
        ),
        descriptor(
            "tanh",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex hyperbolic tangent",
            &[(&[5.0, 2.0], &[1.000_059_350_149, -0.000_068_721_638_801_192_75])],
        ),
        descriptor(
            "atanh",
            TWO_F64_IN_TWO_F64_OUT,
            "Complex hyperbolic arctangent",
            &[(
                &[1.000_059_350_149, -0.000_068_721_638_801_192_75],
                &[4.999_999_999_999_926, -1.141_592_653_589_878_8],
            )],
        ),
    ]
    .into_iter()
    .collect()
}
