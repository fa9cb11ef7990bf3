//! Campaign driver: load every module, then run each suite against its library.

use std::io::Write;
use std::path::Path;

use wasmfract_core::structured_log::{
    LogEmitter, LogEntry, LogLevel, Outcome, SharedLog, StreamKind, now_utc, record, shared,
};
use wasmfract_core::TestRunner;
use wasmfract_loader::ModuleLoader;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::report::{CampaignReport, SuiteReport, write_console};

/// Run a complete campaign, write its reports and print the console summary
/// to stdout and stderr.
///
/// Load failures abort the campaign. Conformance failures do not; they are
/// recorded in the returned report.
pub fn run_campaign(config: &HarnessConfig) -> Result<CampaignReport, HarnessError> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    run_campaign_to(config, &mut stdout.lock(), &mut stderr.lock())
}

/// [`run_campaign`] with explicit console streams. Per-function detail is
/// printed only when `show_detail` is set.
pub fn run_campaign_to(
    config: &HarnessConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<CampaignReport, HarnessError> {
    let emitter = match &config.log_path {
        Some(path) => {
            create_parent(path)?;
            LogEmitter::to_file(path, "harness", &config.campaign)?
        }
        None => LogEmitter::sink("harness", &config.campaign),
    };
    let log = shared(emitter);

    let result = run_with_log(config, &log);
    if let Err(err) = &result {
        record(
            Some(&log),
            LogEntry::new("", LogLevel::Error, "campaign_aborted")
                .with_outcome(Outcome::Error)
                .with_message(err.to_string()),
        );
    }
    log.lock().flush()?;

    let report = result?;
    if let Some(path) = &config.report_path {
        create_parent(path)?;
        std::fs::write(path, report.to_markdown())?;
    }
    if let Some(path) = config.json_report_path() {
        std::fs::write(path, report.to_json())?;
    }
    write_console(&report.console_lines(config.show_detail), out, err)?;
    Ok(report)
}

/// Same as [`run_campaign`] but logging to a caller-supplied emitter and
/// writing no report files.
pub fn run_with_log(config: &HarnessConfig, log: &SharedLog) -> Result<CampaignReport, HarnessError> {
    let timestamp = now_utc();
    record(
        Some(log),
        LogEntry::new("", LogLevel::Info, "campaign_start").with_details(serde_json::json!({
            "campaign": config.campaign,
            "modules": config.modules.len(),
            "suites": config.suites.len(),
        })),
    );

    let loader = ModuleLoader::default().with_log(log.clone());
    let mut loaded = loader.load_sequence(&config.modules)?;

    let mut suites = Vec::with_capacity(config.suites.len());
    for suite in &config.suites {
        let catalog = suite.catalog.load()?;
        let format_issues = catalog.format_issues();
        for issue in &format_issues {
            record(
                Some(log),
                LogEntry::new("", LogLevel::Warn, "fixture_format_issue")
                    .with_stream(StreamKind::Conformance)
                    .with_symbol(&suite.library, &issue.key)
                    .with_message(&issue.message),
            );
        }

        let runner = TestRunner::new(&config.campaign, &suite.library).with_log(log.clone());
        let mut bound = loaded
            .bind(&suite.library)
            .ok_or_else(|| HarnessError::LibraryNotLoaded(suite.library.clone()))?;
        let report = runner.run(&mut bound, &catalog);
        let hosted = bound.hosted();

        suites.push(SuiteReport {
            library: suite.library.clone(),
            module_path: hosted.path.display().to_string(),
            sha256: hosted.sha256.clone(),
            format_issues,
            report,
        });
    }

    let report = CampaignReport {
        campaign: config.campaign.clone(),
        timestamp,
        suites,
    };
    record(
        Some(log),
        LogEntry::new("", LogLevel::Info, "campaign_complete")
            .with_outcome(if report.all_passed() {
                Outcome::Pass
            } else {
                Outcome::Fail
            })
            .with_details(serde_json::json!({
                "passed": report.passed(),
                "failed": report.failed(),
                "missing": report.missing(),
            })),
    );
    Ok(report)
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
