//! Numeric bridge between host `f64` arguments and wasm values.
//!
//! Arguments are coerced to each parameter's declared type: integers are
//! truncated toward zero and wrapped to their width, `f32` is rounded to
//! nearest. Results are widened back to `f64`.

use wasmfract_core::InvokeError;
use wasmtime::{AsContextMut, Func, Val, ValType};

/// Short wasm label for a value type.
#[must_use]
pub fn type_label(ty: &ValType) -> &'static str {
    match ty {
        ValType::I32 => "i32",
        ValType::I64 => "i64",
        ValType::F32 => "f32",
        ValType::F64 => "f64",
        ValType::V128 => "v128",
        _ => "ref",
    }
}

fn wrap_i32(x: f64) -> i32 {
    // Saturating cast to i64 first keeps literals such as 0xFFFF0000 intact
    // before they wrap into the signed 32-bit range.
    (x as i64) as i32
}

/// Coerce one host number to a parameter type. `None` for non-numeric types.
#[must_use]
pub fn to_val(ty: &ValType, x: f64) -> Option<Val> {
    match ty {
        ValType::I32 => Some(Val::I32(wrap_i32(x))),
        ValType::I64 => Some(Val::I64(x as i64)),
        ValType::F32 => Some(Val::F32((x as f32).to_bits())),
        ValType::F64 => Some(Val::F64(x.to_bits())),
        _ => None,
    }
}

/// Widen a numeric wasm value to `f64`.
#[must_use]
pub fn from_val(val: &Val) -> Option<f64> {
    match val {
        Val::I32(v) => Some(f64::from(*v)),
        Val::I64(v) => Some(*v as f64),
        Val::F32(bits) => Some(f64::from(f32::from_bits(*bits))),
        Val::F64(bits) => Some(f64::from_bits(*bits)),
        _ => None,
    }
}

fn zero_of(ty: &ValType) -> Val {
    match ty {
        ValType::I64 => Val::I64(0),
        ValType::F32 => Val::F32(0),
        ValType::F64 => Val::F64(0),
        _ => Val::I32(0),
    }
}

fn unsupported(name: &str, ty: &ValType) -> InvokeError {
    InvokeError::UnsupportedType {
        name: name.to_string(),
        ty: type_label(ty).to_string(),
    }
}

/// Call `func` with numeric arguments, returning its results as numbers.
pub fn call_numeric(
    mut store: impl AsContextMut,
    func: &Func,
    name: &str,
    args: &[f64],
) -> Result<Vec<f64>, InvokeError> {
    let ty = func.ty(&store);
    let params: Vec<ValType> = ty.params().collect();
    let results: Vec<ValType> = ty.results().collect();

    if params.len() != args.len() {
        return Err(InvokeError::Arity {
            name: name.to_string(),
            expected: params.len(),
            got: args.len(),
        });
    }

    let inputs = params
        .iter()
        .zip(args)
        .map(|(ty, &x)| to_val(ty, x).ok_or_else(|| unsupported(name, ty)))
        .collect::<Result<Vec<Val>, InvokeError>>()?;
    if let Some(ty) = results.iter().find(|ty| to_val(ty, 0.0).is_none()) {
        return Err(unsupported(name, ty));
    }

    let mut outputs: Vec<Val> = results.iter().map(zero_of).collect();
    func.call(&mut store, &inputs, &mut outputs)
        .map_err(|err| InvokeError::Trap {
            name: name.to_string(),
            message: format!("{err:#}"),
        })?;

    outputs
        .iter()
        .zip(&results)
        .map(|(val, ty)| from_val(val).ok_or_else(|| unsupported(name, ty)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_coercion_truncates_and_wraps() {
        assert!(matches!(to_val(&ValType::I32, 3.9), Some(Val::I32(3))));
        assert!(matches!(to_val(&ValType::I32, -3.9), Some(Val::I32(-3))));
        assert!(matches!(to_val(&ValType::I32, 4_294_901_760.0), Some(Val::I32(-65536))));
        assert!(matches!(to_val(&ValType::I32, f64::NAN), Some(Val::I32(0))));
        assert!(matches!(to_val(&ValType::I64, 1e10), Some(Val::I64(10_000_000_000))));
    }

    #[test]
    fn float_coercion_and_widening() {
        let v = to_val(&ValType::F32, 0.1).unwrap();
        assert_eq!(from_val(&v), Some(f64::from(0.1_f32)));
        let v = to_val(&ValType::F64, -2.5).unwrap();
        assert_eq!(from_val(&v), Some(-2.5));
        assert_eq!(from_val(&Val::I32(-7)), Some(-7.0));
    }

    #[test]
    fn labels() {
        assert_eq!(type_label(&ValType::F64), "f64");
        assert_eq!(type_label(&ValType::I32), "i32");
    }
}
