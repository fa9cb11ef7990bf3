//! Shared model for testing hosted WebAssembly modules.
//!
//! This crate provides:
//! - Datatypes and interface signatures with per-type tolerances
//! - Output values and formatters (hex, boolean)
//! - The tolerance-aware comparator
//! - Fixture catalogs (Rust tables or JSON files)
//! - The conformance executor and its aggregate reports
//! - Structured JSONL logging used by every crate in the workspace

#![forbid(unsafe_code)]

pub mod compare;
pub mod datatype;
pub mod exports;
pub mod fixtures;
pub mod runner;
pub mod structured_log;
pub mod value;
pub mod verify;

pub use compare::{Comparison, ElementResult, Verdict, compare};
pub use datatype::{Datatype, InterfaceSignature};
pub use exports::{ClosureExports, HostedExports, InvokeError};
pub use fixtures::{FixtureCatalog, FixtureError, FunctionTestDescriptor, TestVector};
pub use runner::TestRunner;
pub use structured_log::{LogEmitter, LogEntry, LogLevel, SharedLog};
pub use value::{Formatter, Value};
pub use verify::{TestEntry, TestOutcome, TestReport};
