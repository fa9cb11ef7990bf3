//! Worker state machine and pool behaviour against a small render module.

use std::path::Path;

use tempfile::TempDir;
use wasmfract_core::structured_log::{LogEmitter, SharedBuffer, shared};
use wasmfract_dispatch::{
    Action, Command, Envelope, HostSeed, PoolConfig, ProtocolError, Region, Report, Worker,
    WorkerError, WorkerPool, WorkerState,
};
use wasmfract_loader::{ConstValue, LoadError, ModuleDescriptor};

// mandel_plot logs (width, height, max_iters + bias); julia_plot traps.
const RENDER: &str = r#"
(module
  (import "js" "log3" (func $log3 (param i32 i32 i32 i32)))
  (import "env" "bias" (global $bias i32))
  (global $palette (mut i32) (i32.const 0))
  (func (export "mandel_plot") (param i32 i32 f64 f64 f64 i32)
    i32.const 0
    local.get 0
    local.get 1
    local.get 5
    global.get $bias
    i32.add
    call $log3)
  (func (export "julia_plot") (param i32 i32 f64 f64 f64 f64 f64 i32)
    unreachable)
  (func (export "gen_palette") (param i32)
    local.get 0
    global.set $palette))
"#;

// mandel_plot traps, so the first render of every init fails.
const BROKEN_MANDEL: &str = r#"
(module
  (func (export "mandel_plot") (param i32 i32 f64 f64 f64 i32)
    unreachable)
  (func (export "julia_plot") (param i32 i32 f64 f64 f64 f64 f64 i32)))
"#;

const NO_JULIA: &str = r#"
(module
  (func (export "mandel_plot") (param i32 i32 f64 f64 f64 i32)))
"#;

fn write_wasm(dir: &Path, name: &str, src: &str) -> ModuleDescriptor {
    let path = dir.join(format!("{name}.wasm"));
    std::fs::write(&path, wat::parse_str(src).expect("valid wat")).expect("write wasm");
    ModuleDescriptor::new(path, name)
}

fn setup() -> (TempDir, ModuleDescriptor) {
    let dir = tempfile::tempdir().expect("tempdir");
    let render = write_wasm(dir.path(), "render", RENDER);
    (dir, render)
}

fn seed() -> HostSeed {
    HostSeed::new().with("env", "bias", ConstValue::I32(3))
}

fn region() -> Region {
    Region::mandel(8, 4, -0.5, 0.0, 2.0)
}

fn init_json(worker_id: u32, render: &ModuleDescriptor) -> String {
    serde_json::json!({
        "action": "init",
        "payload": {
            "host_fns": seed(),
            "modules": [render],
            "worker_id": worker_id,
            "region": region(),
            "max_iters": 100,
        }
    })
    .to_string()
}

fn logged_worker() -> (Worker, SharedBuffer) {
    let (emitter, buffer) = LogEmitter::to_buffer("dispatch", "test");
    (Worker::default().with_log(shared(emitter)), buffer)
}

fn events(buffer: &SharedBuffer, event: &str) -> usize {
    buffer.entries().iter().filter(|e| e.event == event).count()
}

#[test]
fn init_of_worker_zero_reports_exactly_once() {
    let (_dir, render) = setup();
    let (mut worker, buffer) = logged_worker();

    let envelope = Envelope::from_json(&init_json(0, &render)).unwrap();
    let report = worker.handle_envelope(envelope).unwrap();

    let Some(Report::ExecComplete(done)) = report else {
        panic!("init must report completion");
    };
    assert_eq!(done.worker_id, 0);
    assert_eq!(done.region_name, "mandel");
    assert!(done.timings.init.end >= done.timings.init.start);
    assert!(done.timings.exec.start >= done.timings.init.end);
    assert_eq!(worker.state(), WorkerState::Ready);
    assert_eq!(worker.worker_id(), Some(0));

    assert_eq!(events(&buffer, "palette_generated"), 1);
    assert_eq!(events(&buffer, "region_rendered"), 1);
    let module_log: Vec<String> = buffer
        .entries()
        .into_iter()
        .filter(|e| e.event == "module_log")
        .filter_map(|e| e.message)
        .collect();
    assert_eq!(module_log, vec!["Mandelbrot: Pixel X, Y, value = 8,4,103"]);
}

#[test]
fn only_the_palette_owner_generates_at_init() {
    let (_dir, render) = setup();
    let (mut worker, buffer) = logged_worker();
    worker
        .handle_envelope(Envelope::from_json(&init_json(1, &render)).unwrap())
        .unwrap();
    assert_eq!(events(&buffer, "palette_generated"), 0);

    // An explicit refresh still runs on any initialised worker.
    let refreshed = worker.handle(Command::RefreshPalette { max_iters: 50 }).unwrap();
    assert!(refreshed.is_none());
    assert_eq!(events(&buffer, "palette_generated"), 1);
}

#[test]
fn exec_keeps_init_timings_and_tracks_region() {
    let (_dir, render) = setup();
    let mut worker = Worker::default();
    worker
        .handle_envelope(Envelope::from_json(&init_json(2, &render)).unwrap())
        .unwrap();
    let init_span = worker.timings().init;

    let report = worker
        .handle(Command::Exec {
            region: Region::mandel(16, 16, 0.0, 0.0, 4.0),
            max_iters: 10,
        })
        .unwrap();
    let Some(Report::ExecComplete(done)) = report else {
        panic!("exec must report completion");
    };
    assert_eq!(done.worker_id, 2);
    assert_eq!(done.timings.init, init_span);
    assert!(done.timings.exec.end >= done.timings.exec.start);
}

#[test]
fn commands_before_init_are_rejected() {
    let (mut worker, buffer) = logged_worker();
    let exec = Command::Exec {
        region: region(),
        max_iters: 10,
    };
    let err = worker.handle_envelope(exec.to_envelope()).unwrap_err();
    assert!(matches!(err, WorkerError::NotInitialized(Action::Exec)), "{err}");

    let refresh = Command::RefreshPalette { max_iters: 10 }.to_envelope();
    let err = worker.handle_envelope(refresh).unwrap_err();
    assert!(matches!(err, WorkerError::NotInitialized(Action::RefreshPalette)));

    assert_eq!(worker.state(), WorkerState::Uninitialized);
    assert_eq!(events(&buffer, "command_rejected"), 2);
}

#[test]
fn unknown_action_is_rejected_not_ignored() {
    let (mut worker, buffer) = logged_worker();
    let envelope = Envelope::from_json(r#"{"action":"render_all","payload":{}}"#).unwrap();
    let err = worker.handle_envelope(envelope).unwrap_err();
    assert!(matches!(
        err,
        WorkerError::Protocol(ProtocolError::UnknownAction(ref a)) if a == "render_all"
    ));
    assert_eq!(worker.state(), WorkerState::Uninitialized);

    let rejected = buffer
        .entries()
        .into_iter()
        .find(|e| e.event == "command_rejected")
        .expect("rejection logged");
    assert_eq!(rejected.details.unwrap()["action"], "render_all");
}

#[test]
fn second_init_is_rejected() {
    let (_dir, render) = setup();
    let mut worker = Worker::default();
    let init = Envelope::from_json(&init_json(0, &render)).unwrap();
    worker.handle_envelope(init.clone()).unwrap();
    let err = worker.handle_envelope(init).unwrap_err();
    assert!(matches!(err, WorkerError::AlreadyInitialized(0)));
}

#[test]
fn failed_init_leaves_worker_uninitialised() {
    let (_dir, render) = setup();
    let mut worker = Worker::default();

    // Without the seed, env.bias cannot be resolved.
    let mut envelope = Envelope::from_json(&init_json(0, &render)).unwrap();
    envelope.payload.host_fns = None;
    let err = worker.handle_envelope(envelope).unwrap_err();
    assert!(matches!(err, WorkerError::Load(LoadError::Instantiate { .. })), "{err}");
    assert_eq!(worker.state(), WorkerState::Uninitialized);
    assert_eq!(worker.worker_id(), None);

    worker
        .handle_envelope(Envelope::from_json(&init_json(0, &render)).unwrap())
        .unwrap();
    assert_eq!(worker.state(), WorkerState::Ready);
}

#[test]
fn init_without_modules_uses_the_configured_sequence() {
    let (_dir, render) = setup();
    let (emitter, buffer) = LogEmitter::to_buffer("dispatch", "test");
    let mut worker = Worker::default()
        .with_modules(vec![render])
        .with_log(shared(emitter));

    let mut envelope = Envelope::from_json(
        r#"{"action":"init","payload":{"worker_id":0,"max_iters":100,
            "region":{"name":"mandel","width":8,"height":4,
                      "origin_x":-0.5,"origin_y":0,"zoom":2}}}"#,
    )
    .unwrap();
    envelope.payload.host_fns = Some(seed());
    let report = worker.handle_envelope(envelope).unwrap();

    let Some(Report::ExecComplete(done)) = report else {
        panic!("init must report completion");
    };
    assert_eq!(done.worker_id, 0);
    assert!(done.timings.init.end >= done.timings.init.start);
    assert_eq!(events(&buffer, "region_rendered"), 1);
    assert_eq!(events(&buffer, "command_rejected"), 0);
}

#[test]
fn init_without_modules_or_default_is_rejected() {
    let (_dir, render) = setup();
    let mut worker = Worker::default();
    let mut envelope = Envelope::from_json(&init_json(0, &render)).unwrap();
    envelope.payload.modules = None;
    let err = worker.handle_envelope(envelope).unwrap_err();
    assert!(matches!(
        err,
        WorkerError::Protocol(ProtocolError::MissingField {
            action: Action::Init,
            field: "modules"
        })
    ));
    assert_eq!(worker.state(), WorkerState::Uninitialized);
}

#[test]
fn trap_during_first_render_undoes_init() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_wasm(dir.path(), "broken", BROKEN_MANDEL);
    let render = write_wasm(dir.path(), "render", RENDER);
    let (mut worker, buffer) = logged_worker();
    let init = |modules| {
        Command::Init(wasmfract_dispatch::InitCommand {
            host_fns: seed(),
            modules: Some(modules),
            worker_id: 0,
            region: region(),
            max_iters: 10,
        })
    };

    let err = worker.handle(init(vec![broken.clone()])).unwrap_err();
    assert!(matches!(err, WorkerError::Invoke(_)), "{err}");
    assert_eq!(worker.state(), WorkerState::Uninitialized);
    assert_eq!(worker.worker_id(), None);
    assert_eq!(worker.timings(), Default::default());

    let err = worker.handle(init(vec![broken])).unwrap_err();
    assert!(!matches!(err, WorkerError::AlreadyInitialized(_)), "{err}");
    let exec = worker.handle(Command::Exec {
        region: region(),
        max_iters: 10,
    });
    assert!(matches!(exec, Err(WorkerError::NotInitialized(Action::Exec))));
    assert_eq!(events(&buffer, "worker_initialised"), 0);

    worker.handle(init(vec![render])).unwrap();
    assert_eq!(worker.state(), WorkerState::Ready);
    assert_eq!(worker.worker_id(), Some(0));
}

#[test]
fn render_trap_is_reported_and_worker_stays_ready() {
    let (_dir, render) = setup();
    let mut worker = Worker::default();
    worker
        .handle_envelope(Envelope::from_json(&init_json(0, &render)).unwrap())
        .unwrap();

    let julia = region().to_julia(-0.8, 0.156);
    let err = worker
        .handle(Command::Exec {
            region: julia,
            max_iters: 10,
        })
        .unwrap_err();
    assert!(matches!(err, WorkerError::Invoke(_)), "{err}");
    assert_eq!(worker.state(), WorkerState::Ready);

    let again = worker.handle(Command::Exec {
        region: region(),
        max_iters: 10,
    });
    assert!(matches!(again, Ok(Some(_))));
}

#[test]
fn render_module_without_julia_entry_point_fails_init() {
    let dir = tempfile::tempdir().unwrap();
    let module = write_wasm(dir.path(), "mandel_only", NO_JULIA);
    let mut worker = Worker::default();
    let init = Command::Init(wasmfract_dispatch::InitCommand {
        host_fns: HostSeed::new(),
        modules: Some(vec![module]),
        worker_id: 0,
        region: region(),
        max_iters: 10,
    });
    let err = worker.handle(init).unwrap_err();
    assert!(matches!(err, WorkerError::MissingExport("julia_plot")));
    assert_eq!(worker.state(), WorkerState::Uninitialized);
}

#[tokio::test]
async fn pool_initialises_every_worker_and_routes_exec() {
    let (_dir, render) = setup();
    let config = PoolConfig {
        workers: 3,
        modules: vec![render],
        host_fns: seed(),
        regions: vec![region()],
        max_iters: 100,
    };
    let (emitter, buffer) = LogEmitter::to_buffer("dispatch", "pool");
    let mut pool = WorkerPool::from_config(&config, Some(shared(emitter))).unwrap();
    assert_eq!(pool.len(), 3);

    pool.init_all(&config).await.unwrap();
    let mut ids: Vec<u32> = pool.collect(3).await.iter().map(Report::worker_id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 2]);

    pool.refresh_palette(64).await.unwrap();
    let unknown = Envelope::from_json(r#"{"action":"explode","payload":{}}"#).unwrap();
    pool.send(2, unknown).await.unwrap();
    pool.exec(2, Region::mandel(2, 2, 0.0, 0.0, 1.0), 5).await.unwrap();

    let Some(Report::ExecComplete(done)) = pool.next_report().await else {
        panic!("exec must report");
    };
    assert_eq!(done.worker_id, 2);

    assert!(matches!(
        pool.exec(7, region(), 5).await,
        Err(wasmfract_dispatch::DispatchError::UnknownWorker(7))
    ));

    pool.shutdown().unwrap();
    assert_eq!(events(&buffer, "worker_initialised"), 3);
    assert_eq!(events(&buffer, "palette_generated"), 2);
    assert_eq!(events(&buffer, "command_rejected"), 1);
}
