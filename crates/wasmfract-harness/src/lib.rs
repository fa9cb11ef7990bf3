//! Conformance harness for hosted WebAssembly libraries.
//!
//! A campaign loads a list of modules in dependency order, runs one fixture
//! catalog per library, and renders console, markdown and JSON reports.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod report;
pub mod suite;

pub use config::{CatalogSource, HarnessConfig, SuiteConfig};
pub use error::{ConfigError, HarnessError};
pub use report::{CampaignReport, ConsoleLine, ConsoleStream, SuiteReport, console_lines};
pub use suite::{run_campaign, run_campaign_to, run_with_log};
