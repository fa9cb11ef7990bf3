//! Campaign configuration.
//!
//! ```json
//! {
//!   "campaign": "nightly",
//!   "modules": [
//!     { "binary_path": "complex.wasm", "library_name": "complex" },
//!     { "binary_path": "mandel.wasm", "library_name": "mandel" }
//!   ],
//!   "suites": [
//!     { "library": "complex", "catalog": { "builtin": "complex" } },
//!     { "library": "mandel", "catalog": { "file": "mandel_fixtures.json" } }
//!   ],
//!   "show_detail": true,
//!   "log_path": "run.jsonl",
//!   "report_path": "report.md"
//! }
//! ```
//!
//! Relative paths in a config loaded from disk resolve against the config
//! file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wasmfract_core::FixtureCatalog;
use wasmfract_loader::ModuleDescriptor;

use crate::catalog;
use crate::error::{ConfigError, HarnessError};

/// Where a suite's vectors come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Builtin(String),
    File(PathBuf),
}

impl CatalogSource {
    pub fn load(&self) -> Result<FixtureCatalog, HarnessError> {
        match self {
            Self::Builtin(name) => {
                catalog::builtin(name).ok_or_else(|| HarnessError::UnknownCatalog(name.clone()))
            }
            Self::File(path) => Ok(FixtureCatalog::from_file(path)?),
        }
    }
}

/// One library to test and the catalog to test it with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub library: String,
    pub catalog: CatalogSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub campaign: String,
    /// Load order. A module may import from any module listed before it.
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default)]
    pub suites: Vec<SuiteConfig>,
    #[serde(default)]
    pub show_detail: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    /// Markdown report; a JSON report is written next to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl HarnessConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Structural checks that do not touch the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.campaign.trim().is_empty() {
            return Err(ConfigError::Invalid("campaign name is empty".into()));
        }
        if self.modules.is_empty() {
            return Err(ConfigError::Invalid("no modules to load".into()));
        }
        for suite in &self.suites {
            if !self.modules.iter().any(|m| m.library_name == suite.library) {
                return Err(ConfigError::Invalid(format!(
                    "suite library '{}' is not among the loaded modules",
                    suite.library
                )));
            }
            if let CatalogSource::Builtin(name) = &suite.catalog
                && catalog::builtin(name).is_none()
            {
                return Err(ConfigError::Invalid(format!(
                    "unknown built-in catalog '{name}' (known: {})",
                    catalog::BUILTIN_NAMES.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Make every relative path absolute against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        for module in &mut self.modules {
            resolve(&mut module.binary_path);
        }
        for suite in &mut self.suites {
            if let CatalogSource::File(path) = &mut suite.catalog {
                resolve(path);
            }
        }
        if let Some(path) = &mut self.log_path {
            resolve(path);
        }
        if let Some(path) = &mut self.report_path {
            resolve(path);
        }
    }

    /// JSON report path derived from the markdown one.
    #[must_use]
    pub fn json_report_path(&self) -> Option<PathBuf> {
        self.report_path.as_ref().map(|p| p.with_extension("json"))
    }
}
