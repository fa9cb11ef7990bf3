//! Conformance test execution.

use crate::compare::{Verdict, compare};
use crate::exports::{HostedExports, InvokeError};
use crate::fixtures::{FixtureCatalog, FunctionTestDescriptor, TestVector};
use crate::structured_log::{LogEntry, LogLevel, Outcome, SharedLog, StreamKind, record};
use crate::value::{Formatter, join_values};
use crate::verify::{TestEntry, TestOutcome, TestReport};

/// Runs a fixture catalog against the function exports of one module.
#[derive(Debug, Clone)]
pub struct TestRunner {
    pub campaign: String,
    /// Library name used in log records.
    pub library: String,
    log: Option<SharedLog>,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>, library: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            library: library.into(),
            log: None,
        }
    }

    #[must_use]
    pub fn with_log(mut self, log: SharedLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Test every function export of `module`, in declaration order.
    ///
    /// Exports without a descriptor are counted as missing. Descriptors for
    /// functions the module does not export are ignored. Invocation failures
    /// become FAIL outcomes; this never returns an error.
    pub fn run(&self, module: &mut dyn HostedExports, catalog: &FixtureCatalog) -> TestReport {
        let mut report = TestReport::default();

        for export in module.function_exports() {
            let entry = match catalog.get(&export) {
                Some(desc) => self.run_descriptor(module, &export, desc),
                None => self.missing(&export),
            };
            report.push(entry);
        }

        record(
            self.log.as_ref(),
            LogEntry::new("", LogLevel::Info, "module_tested")
                .with_stream(StreamKind::Conformance)
                .with_library(&self.library)
                .with_outcome(if report.all_passed() {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                })
                .with_details(serde_json::json!({
                    "campaign": self.campaign,
                    "passed": report.passed,
                    "failed": report.failed,
                    "missing": report.missing,
                })),
        );
        report
    }

    fn missing(&self, export: &str) -> TestEntry {
        let entry = TestEntry::missing(export);
        record(
            self.log.as_ref(),
            LogEntry::new("", LogLevel::Warn, "test_missing")
                .with_stream(StreamKind::Conformance)
                .with_symbol(&self.library, export)
                .with_outcome(Outcome::Skip)
                .with_message(&entry.description),
        );
        entry
    }

    fn run_descriptor(
        &self,
        module: &mut dyn HostedExports,
        export: &str,
        desc: &FunctionTestDescriptor,
    ) -> TestEntry {
        let outcomes = desc
            .vectors
            .iter()
            .map(|vector| {
                let outcome = run_vector(module, desc, vector);
                let (level, tag) = if outcome.verdict.is_pass() {
                    (LogLevel::Info, Outcome::Pass)
                } else {
                    (LogLevel::Error, Outcome::Fail)
                };
                record(
                    self.log.as_ref(),
                    LogEntry::new("", level, "vector_outcome")
                        .with_stream(StreamKind::Conformance)
                        .with_symbol(&self.library, export)
                        .with_outcome(tag)
                        .with_message(&outcome.message),
                );
                outcome
            })
            .collect();

        TestEntry::tested(export, format!("Test name: '{}'", desc.description), outcomes)
    }
}

/// Invoke one vector and judge the result.
pub fn run_vector(
    module: &mut dyn HostedExports,
    desc: &FunctionTestDescriptor,
    vector: &TestVector,
) -> TestOutcome {
    let inputs = join_values(&Formatter::None.apply_all(&vector.when_passed));
    let expected = vector.formatter.apply_all(&vector.should_get);

    match module.invoke(&desc.name, &vector.when_passed) {
        Ok(raw) => {
            let actual = vector.formatter.apply_all(&raw);
            let verdict = compare(&desc.signature.output, &actual, &expected).verdict();
            TestOutcome {
                verdict,
                message: format!(
                    "{}: {}({inputs}) => [{}], expected [{}]",
                    verdict.label(),
                    desc.name,
                    join_values(&actual),
                    join_values(&expected),
                ),
            }
        }
        Err(err) => invocation_failure(desc, &inputs, &expected, &err),
    }
}

fn invocation_failure(
    desc: &FunctionTestDescriptor,
    inputs: &str,
    expected: &[crate::value::Value],
    err: &InvokeError,
) -> TestOutcome {
    TestOutcome {
        verdict: Verdict::Fail,
        message: format!(
            "{}: {}({inputs}) => {err}, expected [{}]",
            Verdict::Fail.label(),
            desc.name,
            join_values(expected),
        ),
    }
}
