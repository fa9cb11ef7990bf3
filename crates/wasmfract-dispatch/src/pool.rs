//! Coordinator side: a fixed set of worker threads driven over channels.
//!
//! Each worker owns its engine, store and module instance; nothing mutable is
//! shared between them. Commands to one worker run in arrival order. Reports
//! from different workers arrive in whatever order they finish.

use std::path::Path;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use wasmfract_core::structured_log::SharedLog;
use wasmfract_loader::{ModuleDescriptor, ModuleLoader};

use crate::error::DispatchError;
use crate::protocol::{Command, Envelope, InitCommand, Report};
use crate::region::Region;
use crate::seed::HostSeed;
use crate::worker::{PALETTE_OWNER, Worker};

const CHANNEL_CAPACITY: usize = 64;

/// Pool layout and the `init` payload every worker receives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub workers: u32,
    pub modules: Vec<ModuleDescriptor>,
    #[serde(default)]
    pub host_fns: HostSeed,
    /// One region for all workers, or one per worker.
    pub regions: Vec<Region>,
    pub max_iters: u32,
}

impl PoolConfig {
    pub fn from_json(json: &str) -> Result<Self, DispatchError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DispatchError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&content)?;
        if let Some(base) = path.parent() {
            for module in &mut config.modules {
                if module.binary_path.is_relative() {
                    module.binary_path = base.join(&module.binary_path);
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.workers == 0 {
            return Err(DispatchError::Config("at least one worker is required".into()));
        }
        if self.modules.is_empty() {
            return Err(DispatchError::Config("no modules to load".into()));
        }
        let regions = self.regions.len();
        if regions != 1 && regions != self.workers as usize {
            return Err(DispatchError::Config(format!(
                "{regions} regions for {} workers; expected 1 or one per worker",
                self.workers
            )));
        }
        Ok(())
    }

    /// The region assigned to `worker` at init.
    #[must_use]
    pub fn region_for(&self, worker: u32) -> Option<Region> {
        match self.regions.as_slice() {
            [only] => Some(*only),
            all => all.get(worker as usize).copied(),
        }
    }

    #[must_use]
    pub fn init_command(&self, worker: u32) -> Option<Command> {
        Some(Command::Init(InitCommand {
            host_fns: self.host_fns.clone(),
            modules: Some(self.modules.clone()),
            worker_id: worker,
            region: self.region_for(worker)?,
            max_iters: self.max_iters,
        }))
    }
}

/// Handle to a set of running workers.
#[derive(Debug)]
pub struct WorkerPool {
    senders: Vec<mpsc::Sender<Envelope>>,
    handles: Vec<JoinHandle<()>>,
    reports: mpsc::Receiver<Report>,
}

impl WorkerPool {
    /// Start one idle worker per configured slot, each defaulting to the
    /// configured module sequence.
    pub fn from_config(config: &PoolConfig, log: Option<SharedLog>) -> Result<Self, DispatchError> {
        Self::start(config.workers, Some(config.modules.clone()), log)
    }

    /// Start `count` idle workers with no default modules. They wait for an
    /// `init` that names its own.
    pub fn spawn(count: u32, log: Option<SharedLog>) -> Result<Self, DispatchError> {
        Self::start(count, None, log)
    }

    fn start(
        count: u32,
        modules: Option<Vec<ModuleDescriptor>>,
        log: Option<SharedLog>,
    ) -> Result<Self, DispatchError> {
        let (report_tx, reports) = mpsc::channel(CHANNEL_CAPACITY);
        let mut senders = Vec::with_capacity(count as usize);
        let mut handles = Vec::with_capacity(count as usize);

        for index in 0..count {
            let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
            let report_tx = report_tx.clone();
            let modules = modules.clone();
            let log = log.clone();
            let handle = std::thread::Builder::new()
                .name(format!("render-worker-{index}"))
                .spawn(move || worker_loop(rx, report_tx, modules, log))?;
            senders.push(tx);
            handles.push(handle);
        }

        Ok(Self {
            senders,
            handles,
            reports,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Queue a raw envelope for `worker`.
    pub async fn send(&self, worker: u32, envelope: Envelope) -> Result<(), DispatchError> {
        let sender = self
            .senders
            .get(worker as usize)
            .ok_or(DispatchError::UnknownWorker(worker))?;
        sender
            .send(envelope)
            .await
            .map_err(|_| DispatchError::WorkerGone(worker))
    }

    pub async fn command(&self, worker: u32, command: &Command) -> Result<(), DispatchError> {
        self.send(worker, command.to_envelope()).await
    }

    /// Send `init` to every worker, each with its own region.
    pub async fn init_all(&self, config: &PoolConfig) -> Result<(), DispatchError> {
        for worker in 0..self.len() as u32 {
            let command = config.init_command(worker).ok_or_else(|| {
                DispatchError::Config(format!("no region for worker {worker}"))
            })?;
            self.command(worker, &command).await?;
        }
        Ok(())
    }

    pub async fn exec(&self, worker: u32, region: Region, max_iters: u32) -> Result<(), DispatchError> {
        self.command(worker, &Command::Exec { region, max_iters })
            .await
    }

    /// Ask the palette owner to recompute the palette.
    pub async fn refresh_palette(&self, max_iters: u32) -> Result<(), DispatchError> {
        self.command(PALETTE_OWNER, &Command::RefreshPalette { max_iters })
            .await
    }

    /// Next completion report, or `None` once every worker has stopped.
    pub async fn next_report(&mut self) -> Option<Report> {
        self.reports.recv().await
    }

    /// Wait for `count` reports.
    pub async fn collect(&mut self, count: usize) -> Vec<Report> {
        let mut reports = Vec::with_capacity(count);
        while reports.len() < count {
            match self.reports.recv().await {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        reports
    }

    /// Close every command channel and wait for the workers to finish what
    /// they have queued.
    pub fn shutdown(self) -> Result<(), DispatchError> {
        let Self {
            senders, handles, ..
        } = self;
        drop(senders);
        for (index, handle) in handles.into_iter().enumerate() {
            handle
                .join()
                .map_err(|_| DispatchError::WorkerPanicked(index as u32))?;
        }
        Ok(())
    }
}

fn worker_loop(
    mut commands: mpsc::Receiver<Envelope>,
    reports: mpsc::Sender<Report>,
    modules: Option<Vec<ModuleDescriptor>>,
    log: Option<SharedLog>,
) {
    let mut worker = Worker::new(ModuleLoader::default());
    if let Some(modules) = modules {
        worker = worker.with_modules(modules);
    }
    if let Some(log) = log {
        worker = worker.with_log(log);
    }
    while let Some(envelope) = commands.blocking_recv() {
        // Rejected commands are logged by the worker and produce no report.
        if let Ok(Some(report)) = worker.handle_envelope(envelope)
            && reports.blocking_send(report).is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "workers": 3,
        "modules": [{ "binary_path": "render.wasm", "library_name": "render" }],
        "host_fns": { "env": { "bias": { "type": "i32", "value": 1 } } },
        "regions": [{ "name": "mandel", "width": 4, "height": 4,
                      "origin_x": -0.5, "origin_y": 0, "zoom": 1 }],
        "max_iters": 32
    }"#;

    #[test]
    fn single_region_is_broadcast() {
        let config = PoolConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.region_for(2), config.region_for(0));
        let Some(Command::Init(init)) = config.init_command(2) else {
            panic!("expected init");
        };
        assert_eq!(init.worker_id, 2);
        assert_eq!(init.max_iters, 32);
        assert_eq!(init.host_fns.len(), 1);
    }

    #[test]
    fn region_count_must_match_workers() {
        let mut config = PoolConfig::from_json(CONFIG).unwrap();
        let region = config.regions[0];
        config.regions = vec![region, region];
        assert!(matches!(config.validate(), Err(DispatchError::Config(_))));

        config.regions.push(region.to_julia(0.0, 1.0));
        config.validate().unwrap();
        assert_eq!(config.region_for(2).map(|r| r.name()), Some("julia"));
        assert_eq!(config.region_for(3), None);
    }

    #[test]
    fn zero_workers_is_invalid() {
        let json = CONFIG.replace("\"workers\": 3", "\"workers\": 0");
        assert!(PoolConfig::from_json(&json).is_err());
    }
}
