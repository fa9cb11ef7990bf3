//! Host registry seed shipped to workers in the `init` payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use wasmfract_loader::{ConstValue, HostRegistryBuilder, HostState, LoadError};
use wasmtime::Caller;

/// Library that receives the worker-local logging hook.
pub const LOG_LIBRARY: &str = "js";
pub const LOG_FUNCTION: &str = "log3";

/// Messages a render module can emit through `js.log3(index, a, b, c)`.
/// Each flag selects hex rendering for the matching value.
const LOG_MESSAGES: [(&str, [bool; 3]); 2] = [
    ("Mandelbrot: Pixel X, Y, value", [false, false, false]),
    ("Julia: Pixel X, Y, value", [false, false, false]),
];

/// Serialisable host entries: library name to constant name to value.
///
/// Callbacks cannot cross a worker boundary, so a worker adds those itself
/// with [`install_log_hook`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostSeed(BTreeMap<String, BTreeMap<String, ConstValue>>);

impl HostSeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, library: &str, name: &str, value: ConstValue) -> Self {
        self.insert(library, name, value);
        self
    }

    pub fn insert(&mut self, library: &str, name: &str, value: ConstValue) {
        self.0
            .entry(library.to_string())
            .or_default()
            .insert(name.to_string(), value);
    }

    #[must_use]
    pub fn get(&self, library: &str, name: &str) -> Option<ConstValue> {
        self.0.get(library)?.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Define every constant on `builder`.
    pub fn apply(&self, builder: &mut HostRegistryBuilder) -> Result<(), LoadError> {
        for (library, entries) in &self.0 {
            for (name, value) in entries {
                builder.define_const(library, name, *value)?;
            }
        }
        Ok(())
    }
}

/// Register `js.log3`, which appends formatted lines to the store's message list.
pub fn install_log_hook(builder: &mut HostRegistryBuilder) -> Result<(), LoadError> {
    builder.func_wrap(
        LOG_LIBRARY,
        LOG_FUNCTION,
        |mut caller: Caller<'_, HostState>, index: i32, a: i32, b: i32, c: i32| {
            caller.data_mut().messages.push(format_log3(index, [a, b, c]));
        },
    )?;
    Ok(())
}

/// Render one `log3` call against the message table.
#[must_use]
pub fn format_log3(index: i32, values: [i32; 3]) -> String {
    let entry = usize::try_from(index).ok().and_then(|i| LOG_MESSAGES.get(i));
    match entry {
        Some((message, as_hex)) => {
            let rendered: Vec<String> = values
                .iter()
                .zip(as_hex)
                .map(|(&v, &hex)| if hex { signed_hex(v) } else { v.to_string() })
                .collect();
            format!("{message} = {}", rendered.join(","))
        }
        None => format!(
            "log3[{index}] = {}",
            values.map(|v| v.to_string()).join(",")
        ),
    }
}

fn signed_hex(v: i32) -> String {
    let sign = if v < 0 { "-" } else { "" };
    format!("{sign}0x{:08x}", v.unsigned_abs())
}
