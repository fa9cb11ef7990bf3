//! Dependency-ordered module instantiation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use wasmfract_core::structured_log::{LogEntry, LogLevel, Outcome, SharedLog, StreamKind, record};
use wasmfract_core::{HostedExports, InvokeError};
use wasmtime::{Engine, ExternType, Func, Instance, Linker, Module, Store};

use crate::error::LoadError;
use crate::invoke::call_numeric;
use crate::registry::{FunctionKey, HostRegistry, HostRegistryBuilder, HostState};

/// One binary module and the library name its exports are registered under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub binary_path: PathBuf,
    pub library_name: String,
}

impl ModuleDescriptor {
    #[must_use]
    pub fn new(binary_path: impl Into<PathBuf>, library_name: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            library_name: library_name.into(),
        }
    }
}

/// An instantiated module.
#[derive(Debug, Clone)]
pub struct HostedModule {
    pub library: String,
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the binary as read from disk.
    pub sha256: String,
    /// Function exports in declaration order.
    pub function_exports: Vec<String>,
    instance: Instance,
}

/// Result of a complete loading pass.
pub struct LoadedModules {
    store: Store<HostState>,
    linker: Linker<HostState>,
    registry: HostRegistry,
    modules: Vec<HostedModule>,
}

impl std::fmt::Debug for LoadedModules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModules")
            .field("modules", &self.modules)
            .field("registry", &self.registry.len())
            .finish_non_exhaustive()
    }
}

/// Instantiates module sequences against a shared engine.
#[derive(Clone, Default)]
pub struct ModuleLoader {
    engine: Engine,
    log: Option<SharedLog>,
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("logging", &self.log.is_some())
            .finish_non_exhaustive()
    }
}

impl ModuleLoader {
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self { engine, log: None }
    }

    #[must_use]
    pub fn with_log(mut self, log: SharedLog) -> Self {
        self.log = Some(log);
        self
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// A fresh builder for seeding host functions before [`Self::load`].
    #[must_use]
    pub fn builder(&self) -> HostRegistryBuilder {
        HostRegistryBuilder::new(&self.engine)
    }

    /// Load `descriptors` with an empty seed.
    pub fn load_sequence(&self, descriptors: &[ModuleDescriptor]) -> Result<LoadedModules, LoadError> {
        self.load(self.builder(), descriptors)
    }

    /// Instantiate `descriptors` strictly in order. Each module's imports are
    /// resolved against the seed plus every earlier module's exports. The
    /// first failure aborts the pass.
    pub fn load(
        &self,
        mut builder: HostRegistryBuilder,
        descriptors: &[ModuleDescriptor],
    ) -> Result<LoadedModules, LoadError> {
        let mut modules = Vec::with_capacity(descriptors.len());
        for desc in descriptors {
            match self.load_one(&mut builder, desc) {
                Ok(module) => modules.push(module),
                Err(err) => {
                    record(
                        self.log.as_ref(),
                        LogEntry::new("", LogLevel::Error, "module_load_failed")
                            .with_stream(StreamKind::Load)
                            .with_library(&desc.library_name)
                            .with_outcome(Outcome::Error)
                            .with_message(err.to_string()),
                    );
                    return Err(err);
                }
            }
        }

        let (store, linker, registry) = builder.freeze();
        Ok(LoadedModules {
            store,
            linker,
            registry,
            modules,
        })
    }

    fn load_one(
        &self,
        builder: &mut HostRegistryBuilder,
        desc: &ModuleDescriptor,
    ) -> Result<HostedModule, LoadError> {
        let started = Instant::now();
        let library = desc.library_name.as_str();
        let bytes = std::fs::read(&desc.binary_path).map_err(|source| LoadError::Read {
            path: desc.binary_path.clone(),
            source,
        })?;
        let sha256 = hex_lower(&Sha256::digest(&bytes));

        let module = Module::new(&self.engine, &bytes).map_err(|err| LoadError::Compile {
            library: library.to_string(),
            path: desc.binary_path.clone(),
            message: format!("{err:#}"),
        })?;
        drop(bytes);

        let instance = builder
            .linker
            .instantiate(&mut builder.store, &module)
            .map_err(|err| LoadError::Instantiate {
                library: library.to_string(),
                message: format!("{err:#}"),
            })?;
        let merged = builder.merge_instance(library, instance)?;

        let function_exports: Vec<String> = module
            .exports()
            .filter(|export| matches!(export.ty(), ExternType::Func(_)))
            .map(|export| export.name().to_string())
            .collect();

        record(
            self.log.as_ref(),
            LogEntry::new("", LogLevel::Info, "module_instantiated")
                .with_stream(StreamKind::Load)
                .with_library(library)
                .with_outcome(Outcome::Pass)
                .with_duration_ms(started.elapsed().as_millis() as u64)
                .with_details(serde_json::json!({
                    "path": desc.binary_path.display().to_string(),
                    "sha256": sha256,
                    "exports": merged,
                    "functions": function_exports.len(),
                })),
        );

        Ok(HostedModule {
            library: library.to_string(),
            path: desc.binary_path.clone(),
            sha256,
            function_exports,
            instance,
        })
    }
}

fn hex_lower(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// SHA-256 of a file on disk, in the same form recorded on [`HostedModule`].
pub fn file_sha256(path: &Path) -> Result<String, std::io::Error> {
    Ok(hex_lower(&Sha256::digest(std::fs::read(path)?)))
}

impl LoadedModules {
    #[must_use]
    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    #[must_use]
    pub fn modules(&self) -> &[HostedModule] {
        &self.modules
    }

    /// Most recently loaded module registered under `library`.
    #[must_use]
    pub fn module(&self, library: &str) -> Option<&HostedModule> {
        self.modules.iter().rev().find(|m| m.library == library)
    }

    /// The last module of the sequence.
    #[must_use]
    pub fn last(&self) -> Option<&HostedModule> {
        self.modules.last()
    }

    /// Executor view of the module registered under `library`.
    pub fn bind(&mut self, library: &str) -> Option<BoundModule<'_>> {
        let module = self.modules.iter().rev().find(|m| m.library == library)?;
        Some(BoundModule {
            store: &mut self.store,
            module,
        })
    }

    /// Executor view of the module at `index` in load order.
    pub fn bind_index(&mut self, index: usize) -> Option<BoundModule<'_>> {
        let module = self.modules.get(index)?;
        Some(BoundModule {
            store: &mut self.store,
            module,
        })
    }

    /// Resolve a registry entry to a callable function.
    pub fn func(&mut self, key: &FunctionKey) -> Option<Func> {
        self.linker
            .get(&mut self.store, &key.library, &key.function)
            .and_then(|item| item.into_func())
    }

    /// Call `library.function` through the registry.
    pub fn call(&mut self, key: &FunctionKey, args: &[f64]) -> Result<Vec<f64>, InvokeError> {
        let name = key.to_string();
        let func = self
            .func(key)
            .ok_or_else(|| InvokeError::UnknownExport(name.clone()))?;
        call_numeric(&mut self.store, &func, &name, args)
    }

    /// Resolve a function export of `module` once, for repeated
    /// [`Self::call_func`] invocations.
    pub fn export_func(&mut self, module: &HostedModule, name: &str) -> Option<Func> {
        module
            .instance
            .get_export(&mut self.store, name)
            .and_then(|item| item.into_func())
    }

    /// Call a previously resolved function; `name` is used in errors only.
    pub fn call_func(&mut self, func: &Func, name: &str, args: &[f64]) -> Result<Vec<f64>, InvokeError> {
        call_numeric(&mut self.store, func, name, args)
    }

    /// Drain lines recorded by host callbacks.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.store.data_mut().messages)
    }
}

/// A loaded module paired with the store it lives in.
pub struct BoundModule<'a> {
    store: &'a mut Store<HostState>,
    module: &'a HostedModule,
}

impl BoundModule<'_> {
    #[must_use]
    pub fn hosted(&self) -> &HostedModule {
        self.module
    }
}

impl HostedExports for BoundModule<'_> {
    fn function_exports(&self) -> Vec<String> {
        self.module.function_exports.clone()
    }

    fn invoke(&mut self, name: &str, args: &[f64]) -> Result<Vec<f64>, InvokeError> {
        let func = match self.module.instance.get_export(&mut *self.store, name) {
            Some(item) => item
                .into_func()
                .ok_or_else(|| InvokeError::NotAFunction(name.to_string()))?,
            None => return Err(InvokeError::UnknownExport(name.to_string())),
        };
        call_numeric(&mut *self.store, &func, name, args)
    }
}
