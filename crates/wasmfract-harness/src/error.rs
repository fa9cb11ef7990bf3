use thiserror::Error;
use wasmfract_core::FixtureError;
use wasmfract_loader::LoadError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Anything that stops a campaign from producing a report.
///
/// Conformance failures are not errors; they end up in the report.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("fixtures: {0}")]
    Fixture(#[from] FixtureError),
    #[error("load: {0}")]
    Load(#[from] LoadError),
    #[error("unknown built-in catalog '{0}'")]
    UnknownCatalog(String),
    #[error("library '{0}' was not loaded")]
    LibraryNotLoaded(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
