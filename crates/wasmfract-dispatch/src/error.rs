use thiserror::Error;
use wasmfract_core::InvokeError;
use wasmfract_loader::LoadError;

use crate::protocol::Action;

/// Malformed inbound envelopes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid envelope json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("{action} payload is missing '{field}'")]
    MissingField { action: Action, field: &'static str },
}

/// A command a worker could not carry out.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("{0} received before init")]
    NotInitialized(Action),
    #[error("worker {0} is already initialised")]
    AlreadyInitialized(u32),
    #[error("no modules to load")]
    NoRenderModule,
    #[error("render module does not export '{0}'")]
    MissingExport(&'static str),
    #[error("load: {0}")]
    Load(#[from] LoadError),
    #[error("render: {0}")]
    Invoke(#[from] InvokeError),
}

/// Coordinator-side failures.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pool config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid pool config: {0}")]
    Config(String),
    #[error("no worker {0}")]
    UnknownWorker(u32),
    #[error("worker {0} has stopped")]
    WorkerGone(u32),
    #[error("worker {0} panicked")]
    WorkerPanicked(u32),
}
