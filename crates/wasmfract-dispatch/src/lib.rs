//! Parallel tile-rendering dispatch.
//!
//! Workers each load a private copy of the module sequence, then render the
//! regions they are sent and report timings back to the coordinator.

#![forbid(unsafe_code)]

pub mod error;
pub mod pool;
pub mod protocol;
pub mod region;
pub mod seed;
pub mod worker;

pub use error::{DispatchError, ProtocolError, WorkerError};
pub use pool::{PoolConfig, WorkerPool};
pub use protocol::{Action, Command, Envelope, ExecComplete, InitCommand, Payload, Report, Span, Timings};
pub use region::Region;
pub use seed::HostSeed;
pub use worker::{PALETTE_OWNER, Worker, WorkerState};
