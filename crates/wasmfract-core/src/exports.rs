//! The executor's view of a loaded module.
//!
//! [`HostedExports`] is the seam between the conformance executor and whatever
//! actually runs the code. The loader crate binds it to a wasmtime instance;
//! tests bind it to plain closures.

use thiserror::Error;

/// Why a single invocation produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("no export named '{0}'")]
    UnknownExport(String),
    #[error("export '{0}' is not a function")]
    NotAFunction(String),
    #[error("{name} takes {expected} argument(s), {got} supplied")]
    Arity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("{name} uses non-numeric type {ty}")]
    UnsupportedType { name: String, ty: String },
    #[error("{name} trapped: {message}")]
    Trap { name: String, message: String },
}

/// Named, callable functions of one loaded module.
pub trait HostedExports {
    /// Names of function exports, in the module's declaration order.
    /// Non-function exports (memories, globals, tables) are excluded.
    fn function_exports(&self) -> Vec<String>;

    /// Call `name` with numeric arguments. A scalar result comes back as a
    /// one-element vector; multi-value results keep their order.
    fn invoke(&mut self, name: &str, args: &[f64]) -> Result<Vec<f64>, InvokeError>;
}

type Callable = Box<dyn FnMut(&[f64]) -> Result<Vec<f64>, InvokeError> + Send>;

/// A [`HostedExports`] made of Rust closures.
///
/// Used to exercise the executor without a wasm engine, and as a reference
/// implementation when comparing hosted builds against native ones.
#[derive(Default)]
pub struct ClosureExports {
    functions: Vec<(String, Callable)>,
}

impl std::fmt::Debug for ClosureExports {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.functions.iter().map(|(name, _)| name))
            .finish()
    }
}

impl ClosureExports {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a function. Later entries with the same name shadow earlier ones.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&[f64]) -> Result<Vec<f64>, InvokeError> + Send + 'static,
    {
        let name = name.into();
        self.functions.retain(|(n, _)| *n != name);
        self.functions.push((name, Box::new(f)));
        self
    }
}

impl HostedExports for ClosureExports {
    fn function_exports(&self) -> Vec<String> {
        self.functions.iter().map(|(name, _)| name.clone()).collect()
    }

    fn invoke(&mut self, name: &str, args: &[f64]) -> Result<Vec<f64>, InvokeError> {
        let (_, f) = self
            .functions
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| InvokeError::UnknownExport(name.to_string()))?;
        f(args)
    }
}
