//! Message envelopes exchanged between the coordinator and its workers.
//!
//! Inbound:
//!
//! ```json
//! { "action": "init", "payload": { "host_fns": {..}, "modules": [..],
//!   "worker_id": 0, "region": {..}, "max_iters": 100 } }
//! ```
//!
//! Outbound:
//!
//! ```json
//! { "status": "exec_complete", "payload": { "worker_id": 0, "region_name": "mandel",
//!   "timings": { "init": { "start": 1.0, "end": 2.0 }, "exec": { "start": 2.0, "end": 3.5 } } } }
//! ```

use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use wasmfract_loader::ModuleDescriptor;

use crate::error::ProtocolError;
use crate::region::Region;
use crate::seed::HostSeed;

/// Every command a worker understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Init,
    Exec,
    RefreshPalette,
}

impl Action {
    pub const ALL: [Self; 3] = [Self::Init, Self::Exec, Self::RefreshPalette];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Exec => "exec",
            Self::RefreshPalette => "refresh_palette",
        }
    }

    /// Parse a wire action name. The older `refresh_colour_palette` spelling
    /// is accepted as well.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "init" => Some(Self::Init),
            "exec" => Some(Self::Exec),
            "refresh_palette" | "refresh_colour_palette" => Some(Self::RefreshPalette),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw inbound message. `action` stays a string so unknown actions reach the
/// worker and are rejected there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub action: String,
    #[serde(default)]
    pub payload: Payload,
}

/// Union of every command's fields; which are required depends on the action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_fns: Option<HostSeed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<ModuleDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iters: Option<u32>,
}

impl Envelope {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Everything a worker needs to become ready.
#[derive(Debug, Clone, PartialEq)]
pub struct InitCommand {
    /// Serialisable part of the host registry. Callbacks are added by the worker.
    pub host_fns: HostSeed,
    /// Load order; the last module is the render module. `None` falls back
    /// to the worker's configured sequence.
    pub modules: Option<Vec<ModuleDescriptor>>,
    pub worker_id: u32,
    pub region: Region,
    pub max_iters: u32,
}

/// A validated inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init(InitCommand),
    Exec { region: Region, max_iters: u32 },
    RefreshPalette { max_iters: u32 },
}

impl Command {
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::Init(_) => Action::Init,
            Self::Exec { .. } => Action::Exec,
            Self::RefreshPalette { .. } => Action::RefreshPalette,
        }
    }

    /// Validate an envelope. Unknown actions and missing required fields are
    /// errors; fields an action does not use are ignored.
    pub fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        let action = Action::parse(&envelope.action)
            .ok_or_else(|| ProtocolError::UnknownAction(envelope.action.clone()))?;
        let p = envelope.payload;
        let missing = |field| ProtocolError::MissingField { action, field };

        Ok(match action {
            Action::Init => Self::Init(InitCommand {
                host_fns: p.host_fns.unwrap_or_default(),
                modules: p.modules,
                worker_id: p.worker_id.ok_or_else(|| missing("worker_id"))?,
                region: p.region.ok_or_else(|| missing("region"))?,
                max_iters: p.max_iters.ok_or_else(|| missing("max_iters"))?,
            }),
            Action::Exec => Self::Exec {
                region: p.region.ok_or_else(|| missing("region"))?,
                max_iters: p.max_iters.ok_or_else(|| missing("max_iters"))?,
            },
            Action::RefreshPalette => Self::RefreshPalette {
                max_iters: p.max_iters.ok_or_else(|| missing("max_iters"))?,
            },
        })
    }

    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        let payload = match self {
            Self::Init(init) => Payload {
                host_fns: Some(init.host_fns.clone()),
                modules: init.modules.clone(),
                worker_id: Some(init.worker_id),
                region: Some(init.region),
                max_iters: Some(init.max_iters),
            },
            Self::Exec { region, max_iters } => Payload {
                region: Some(*region),
                max_iters: Some(*max_iters),
                ..Payload::default()
            },
            Self::RefreshPalette { max_iters } => Payload {
                max_iters: Some(*max_iters),
                ..Payload::default()
            },
        };
        Envelope {
            action: self.action().as_str().to_string(),
            payload,
        }
    }
}

/// Wall-clock interval in milliseconds since [`epoch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl Span {
    /// Start an interval now; close it with [`Self::finish`].
    #[must_use]
    pub fn begin() -> Self {
        let now = now_ms();
        Self {
            start: now,
            end: now,
        }
    }

    pub fn finish(&mut self) {
        self.end = now_ms();
    }

    #[must_use]
    pub fn duration_ms(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    /// Module instantiation; set once by `init`.
    pub init: Span,
    /// Most recent render.
    pub exec: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecComplete {
    pub worker_id: u32,
    pub region_name: String,
    pub timings: Timings,
}

/// Outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "payload", rename_all = "snake_case")]
pub enum Report {
    ExecComplete(ExecComplete),
}

impl Report {
    #[must_use]
    pub fn worker_id(&self) -> u32 {
        match self {
            Self::ExecComplete(done) => done.worker_id,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Process-wide reference point for [`Span`] timestamps.
pub fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

#[must_use]
pub fn now_ms() -> f64 {
    epoch().elapsed().as_secs_f64() * 1000.0
}
