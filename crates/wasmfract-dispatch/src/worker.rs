//! Per-worker state machine.
//!
//! A worker starts [`WorkerState::Uninitialized`]. `init` loads its private
//! module sequence, resolves the render entry points once, draws the initial
//! region and leaves it [`WorkerState::Ready`]. Every later `exec` or
//! `refresh_palette` runs against that same instance.

use wasmfract_core::structured_log::{LogEntry, LogLevel, Outcome, SharedLog, StreamKind, record};
use wasmfract_loader::{HostedModule, LoadedModules, ModuleDescriptor, ModuleLoader};
use wasmtime::Func;

use crate::error::{ProtocolError, WorkerError};
use crate::protocol::{Action, Command, Envelope, ExecComplete, InitCommand, Report, Span, Timings};
use crate::region::Region;
use crate::seed::install_log_hook;

/// The worker that computes the shared colour palette.
pub const PALETTE_OWNER: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Uninitialized,
    Ready,
    Rendering,
}

/// Render module plus its entry points, resolved once at `init`.
struct RenderModule {
    loaded: LoadedModules,
    mandel_plot: Func,
    julia_plot: Func,
    gen_palette: Option<Func>,
}

impl RenderModule {
    fn resolve(mut loaded: LoadedModules) -> Result<Self, WorkerError> {
        let module: HostedModule = loaded.last().cloned().ok_or(WorkerError::NoRenderModule)?;
        let mut export = |name: &'static str| loaded.export_func(&module, name);
        let mandel_plot = export("mandel_plot").ok_or(WorkerError::MissingExport("mandel_plot"))?;
        let julia_plot = export("julia_plot").ok_or(WorkerError::MissingExport("julia_plot"))?;
        let gen_palette = export("gen_palette");
        Ok(Self {
            loaded,
            mandel_plot,
            julia_plot,
            gen_palette,
        })
    }

    fn plot(&mut self, region: &Region, max_iters: u32) -> Result<(), WorkerError> {
        let func = match region {
            Region::Mandel { .. } => self.mandel_plot,
            Region::Julia { .. } => self.julia_plot,
        };
        self.loaded
            .call_func(&func, region.entry_point(), &region.plot_args(max_iters))?;
        Ok(())
    }

    /// Returns false when the module has no palette entry point.
    fn palette(&mut self, max_iters: u32) -> Result<bool, WorkerError> {
        let Some(func) = self.gen_palette else {
            return Ok(false);
        };
        self.loaded
            .call_func(&func, "gen_palette", &[f64::from(max_iters)])?;
        Ok(true)
    }
}

/// One worker's private context, threaded through every command.
pub struct Worker {
    loader: ModuleLoader,
    log: Option<SharedLog>,
    default_modules: Option<Vec<ModuleDescriptor>>,
    worker_id: Option<u32>,
    state: WorkerState,
    timings: Timings,
    render: Option<RenderModule>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("worker_id", &self.worker_id)
            .field("state", &self.state)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

impl Default for Worker {
    fn default() -> Self {
        Self::new(ModuleLoader::default())
    }
}

impl Worker {
    #[must_use]
    pub fn new(loader: ModuleLoader) -> Self {
        Self {
            loader,
            log: None,
            default_modules: None,
            worker_id: None,
            state: WorkerState::Uninitialized,
            timings: Timings::default(),
            render: None,
        }
    }

    /// Log to `log`; the loader logs module events there too.
    #[must_use]
    pub fn with_log(mut self, log: SharedLog) -> Self {
        self.loader = self.loader.with_log(log.clone());
        self.log = Some(log);
        self
    }

    /// Module sequence used when an `init` payload carries none.
    #[must_use]
    pub fn with_modules(mut self, modules: Vec<ModuleDescriptor>) -> Self {
        self.default_modules = Some(modules);
        self
    }

    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    #[must_use]
    pub fn worker_id(&self) -> Option<u32> {
        self.worker_id
    }

    #[must_use]
    pub fn timings(&self) -> Timings {
        self.timings
    }

    /// Parse and run one raw envelope. Rejections are logged before being
    /// returned.
    pub fn handle_envelope(&mut self, envelope: Envelope) -> Result<Option<Report>, WorkerError> {
        let action = envelope.action.clone();
        let result = Command::from_envelope(envelope)
            .map_err(WorkerError::from)
            .and_then(|command| self.handle(command));
        if let Err(err) = &result {
            self.reject(&action, err);
        }
        result
    }

    /// Run one validated command. `init` and `exec` produce a completion
    /// report; `refresh_palette` does not.
    pub fn handle(&mut self, command: Command) -> Result<Option<Report>, WorkerError> {
        match command {
            Command::Init(init) => self.init(init).map(Some),
            Command::Exec { region, max_iters } => self.exec(&region, max_iters).map(Some),
            Command::RefreshPalette { max_iters } => {
                self.refresh_palette(max_iters)?;
                Ok(None)
            }
        }
    }

    fn init(&mut self, init: InitCommand) -> Result<Report, WorkerError> {
        if let Some(id) = self.worker_id {
            return Err(WorkerError::AlreadyInitialized(id));
        }
        let modules = match init.modules.as_ref().or(self.default_modules.as_ref()) {
            Some(modules) => modules.clone(),
            None => {
                return Err(ProtocolError::MissingField {
                    action: Action::Init,
                    field: "modules",
                }
                .into());
            }
        };

        let mut span = Span::begin();
        let mut builder = self.loader.builder();
        init.host_fns.apply(&mut builder)?;
        install_log_hook(&mut builder)?;
        let loaded = self.loader.load(builder, &modules)?;
        let render = RenderModule::resolve(loaded)?;
        span.finish();

        self.worker_id = Some(init.worker_id);
        self.timings.init = span;
        self.render = Some(render);
        self.state = WorkerState::Ready;

        let first = self.first_render(&init);
        if first.is_err() {
            // Nothing of a failed init survives; the worker can be initialised again.
            self.worker_id = None;
            self.timings = Timings::default();
            self.render = None;
            self.state = WorkerState::Uninitialized;
            return first;
        }
        self.log_event(
            LogEntry::new("", LogLevel::Info, "worker_initialised")
                .with_outcome(Outcome::Pass)
                .with_duration_ms(span.duration_ms() as u64)
                .with_details(serde_json::json!({
                    "modules": modules.len(),
                    "seeded": init.host_fns.len(),
                })),
        );
        first
    }

    fn first_render(&mut self, init: &InitCommand) -> Result<Report, WorkerError> {
        if init.worker_id == PALETTE_OWNER {
            self.refresh_palette(init.max_iters)?;
        }
        self.exec(&init.region, init.max_iters)
    }

    fn exec(&mut self, region: &Region, max_iters: u32) -> Result<Report, WorkerError> {
        let (Some(worker_id), Some(render)) = (self.worker_id, self.render.as_mut()) else {
            return Err(WorkerError::NotInitialized(Action::Exec));
        };

        self.state = WorkerState::Rendering;
        let mut span = Span::begin();
        let result = render.plot(region, max_iters);
        span.finish();
        self.state = WorkerState::Ready;
        self.drain_module_log();
        result?;

        self.timings.exec = span;
        let (width, height) = region.size();
        self.log_event(
            LogEntry::new("", LogLevel::Info, "region_rendered")
                .with_symbol("render", region.entry_point())
                .with_outcome(Outcome::Pass)
                .with_duration_ms(span.duration_ms() as u64)
                .with_details(serde_json::json!({
                    "region": region.name(),
                    "width": width,
                    "height": height,
                    "max_iters": max_iters,
                })),
        );

        Ok(Report::ExecComplete(ExecComplete {
            worker_id,
            region_name: region.name().to_string(),
            timings: self.timings,
        }))
    }

    fn refresh_palette(&mut self, max_iters: u32) -> Result<(), WorkerError> {
        let Some(render) = self.render.as_mut() else {
            return Err(WorkerError::NotInitialized(Action::RefreshPalette));
        };
        let generated = render.palette(max_iters)?;
        self.log_event(
            LogEntry::new(
                "",
                if generated { LogLevel::Info } else { LogLevel::Debug },
                if generated { "palette_generated" } else { "palette_unavailable" },
            )
            .with_details(serde_json::json!({ "max_iters": max_iters })),
        );
        Ok(())
    }

    fn drain_module_log(&mut self) {
        let Some(render) = self.render.as_mut() else {
            return;
        };
        for line in render.loaded.take_messages() {
            self.log_event(LogEntry::new("", LogLevel::Debug, "module_log").with_message(line));
        }
    }

    fn reject(&self, action: &str, err: &WorkerError) {
        self.log_event(
            LogEntry::new("", LogLevel::Error, "command_rejected")
                .with_outcome(Outcome::Error)
                .with_message(err.to_string())
                .with_details(serde_json::json!({ "action": action })),
        );
    }

    fn log_event(&self, entry: LogEntry) {
        let mut entry = entry.with_stream(StreamKind::Render);
        if let Some(id) = self.worker_id {
            entry = entry.with_worker(id);
        }
        record(self.log.as_ref(), entry);
    }
}
