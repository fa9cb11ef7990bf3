//! Host function registry and dependency-ordered loader for wasm modules.
//!
//! Modules are instantiated strictly in list order against a registry that
//! grows as each module's exports are merged in, so a later module may import
//! what an earlier one exports.

#![forbid(unsafe_code)]

pub mod error;
pub mod invoke;
pub mod loader;
pub mod registry;

pub use error::LoadError;
pub use loader::{BoundModule, HostedModule, LoadedModules, ModuleDescriptor, ModuleLoader};
pub use registry::{ConstValue, EntryKind, FunctionKey, HostRegistry, HostRegistryBuilder, HostState};
