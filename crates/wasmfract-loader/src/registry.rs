//! Host function registry.
//!
//! During loading a [`HostRegistryBuilder`] owns the store and linker: seeds
//! (host callbacks, constants) are defined first, then each instantiated
//! module's exports are merged under its library name. Freezing the builder
//! yields a read-only [`HostRegistry`] describing every entry by
//! [`FunctionKey`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use wasmtime::{
    Engine, Extern, Global, GlobalType, Instance, IntoFunc, Linker, Mutability, Store, Val, ValType,
};

use crate::error::LoadError;
use crate::invoke::type_label;

/// Per-store host data visible to host callbacks.
#[derive(Debug, Default)]
pub struct HostState {
    /// Lines produced by host callbacks (e.g. a module's logging import).
    pub messages: Vec<String>,
}

/// `library.function` address of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionKey {
    pub library: String,
    pub function: String,
}

impl FunctionKey {
    #[must_use]
    pub fn new(library: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            library: library.into(),
            function: function.into(),
        }
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.library, self.function)
    }
}

/// What a registry entry holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    Function {
        params: Vec<&'static str>,
        results: Vec<&'static str>,
    },
    Global {
        ty: &'static str,
    },
    Memory,
    Table,
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function { params, results } => {
                write!(f, "({}) -> ({})", params.join(", "), results.join(", "))
            }
            Self::Global { ty } => write!(f, "global {ty}"),
            Self::Memory => f.write_str("memory"),
            Self::Table => f.write_str("table"),
            Self::Other => f.write_str("extern"),
        }
    }
}

fn describe_extern(store: &Store<HostState>, item: &Extern) -> EntryKind {
    match item {
        Extern::Func(func) => {
            let ty = func.ty(store);
            EntryKind::Function {
                params: ty.params().map(|t| type_label(&t)).collect(),
                results: ty.results().map(|t| type_label(&t)).collect(),
            }
        }
        Extern::Global(global) => EntryKind::Global {
            ty: type_label(global.ty(store).content()),
        },
        Extern::Memory(_) => EntryKind::Memory,
        Extern::Table(_) => EntryKind::Table,
        _ => EntryKind::Other,
    }
}

/// A constant seeded into the registry before any module loads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ConstValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl ConstValue {
    fn val_type(self) -> ValType {
        match self {
            Self::I32(_) => ValType::I32,
            Self::I64(_) => ValType::I64,
            Self::F32(_) => ValType::F32,
            Self::F64(_) => ValType::F64,
        }
    }

    fn to_val(self) -> Val {
        match self {
            Self::I32(v) => Val::I32(v),
            Self::I64(v) => Val::I64(v),
            Self::F32(v) => Val::F32(v.to_bits()),
            Self::F64(v) => Val::F64(v.to_bits()),
        }
    }
}

/// Mutable registry, alive only for the loading pass.
pub struct HostRegistryBuilder {
    pub(crate) store: Store<HostState>,
    pub(crate) linker: Linker<HostState>,
    entries: BTreeMap<FunctionKey, EntryKind>,
}

impl fmt::Debug for HostRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRegistryBuilder")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl HostRegistryBuilder {
    #[must_use]
    pub fn new(engine: &Engine) -> Self {
        let mut linker = Linker::new(engine);
        // A library loaded twice merges into one namespace; later exports win.
        linker.allow_shadowing(true);
        Self {
            store: Store::new(engine, HostState::default()),
            linker,
            entries: BTreeMap::new(),
        }
    }

    /// Register a host callback under `library.name`.
    pub fn func_wrap<Params, Args>(
        &mut self,
        library: &str,
        name: &str,
        func: impl IntoFunc<HostState, Params, Args>,
    ) -> Result<&mut Self, LoadError> {
        self.linker
            .func_wrap(library, name, func)
            .map_err(|err| define_error(library, name, &err))?;
        self.note(library, name);
        Ok(self)
    }

    /// Register an immutable global under `library.name`.
    pub fn define_const(
        &mut self,
        library: &str,
        name: &str,
        value: ConstValue,
    ) -> Result<&mut Self, LoadError> {
        let ty = GlobalType::new(value.val_type(), Mutability::Const);
        let global = Global::new(&mut self.store, ty, value.to_val())
            .map_err(|err| define_error(library, name, &err))?;
        self.linker
            .define(&self.store, library, name, global)
            .map_err(|err| define_error(library, name, &err))?;
        self.note(library, name);
        Ok(self)
    }

    /// Merge every export of `instance` under `library`, leaving other
    /// libraries untouched.
    pub fn merge_instance(&mut self, library: &str, instance: Instance) -> Result<usize, LoadError> {
        let exports: Vec<(String, Extern)> = instance
            .exports(&mut self.store)
            .map(|export| (export.name().to_string(), export.into_extern()))
            .collect();
        let count = exports.len();
        for (name, item) in exports {
            let kind = describe_extern(&self.store, &item);
            self.linker
                .define(&self.store, library, &name, item)
                .map_err(|err| define_error(library, &name, &err))?;
            self.entries.insert(FunctionKey::new(library, name), kind);
        }
        Ok(count)
    }

    fn note(&mut self, library: &str, name: &str) {
        if let Some(item) = self.linker.get(&mut self.store, library, name) {
            let kind = describe_extern(&self.store, &item);
            self.entries.insert(FunctionKey::new(library, name), kind);
        }
    }

    #[must_use]
    pub fn contains(&self, key: &FunctionKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Close the loading pass.
    pub(crate) fn freeze(self) -> (Store<HostState>, Linker<HostState>, HostRegistry) {
        (
            self.store,
            self.linker,
            HostRegistry {
                entries: self.entries,
            },
        )
    }
}

fn define_error(library: &str, name: &str, err: &wasmtime::Error) -> LoadError {
    LoadError::Define {
        library: library.to_string(),
        name: name.to_string(),
        message: format!("{err:#}"),
    }
}

/// Read-only view of everything the loading pass registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRegistry {
    entries: BTreeMap<FunctionKey, EntryKind>,
}

impl HostRegistry {
    #[must_use]
    pub fn get(&self, key: &FunctionKey) -> Option<&EntryKind> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, library: &str, function: &str) -> bool {
        self.entries.contains_key(&FunctionKey::new(library, function))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct library names, sorted.
    #[must_use]
    pub fn libraries(&self) -> Vec<&str> {
        let mut libs: Vec<&str> = self.entries.keys().map(|k| k.library.as_str()).collect();
        libs.dedup();
        libs
    }

    /// Entry names registered under `library`, sorted.
    #[must_use]
    pub fn functions_of(&self, library: &str) -> Vec<&str> {
        self.entries
            .keys()
            .filter(|k| k.library == library)
            .map(|k| k.function.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FunctionKey, &EntryKind)> {
        self.entries.iter()
    }

    /// One `library.name : type` line per entry.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(key, kind)| format!("{key} : {kind}"))
            .collect()
    }
}
