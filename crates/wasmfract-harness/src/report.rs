//! Report generation for conformance campaigns.

use std::io::Write;

use serde::{Deserialize, Serialize};
use wasmfract_core::TestReport;
use wasmfract_core::fixtures::FormatIssue;

/// Destination of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    Log,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLine {
    pub stream: ConsoleStream,
    pub text: String,
}

impl ConsoleLine {
    fn new(stream: ConsoleStream, text: impl Into<String>) -> Self {
        Self {
            stream,
            text: text.into(),
        }
    }
}

/// The two summary lines for one module.
#[must_use]
pub fn summary_lines(report: &TestReport) -> Vec<ConsoleLine> {
    let coverage = match report.missing {
        0 => ConsoleLine::new(ConsoleStream::Log, "All WASM exports tested"),
        1 => ConsoleLine::new(ConsoleStream::Warn, "1 WASM export test missing"),
        n => ConsoleLine::new(ConsoleStream::Warn, format!("{n} WASM export tests missing")),
    };
    vec![
        coverage,
        ConsoleLine::new(
            ConsoleStream::Log,
            format!(
                "Performed {} tests: {} passed, {} failed",
                report.total(),
                report.passed,
                report.failed
            ),
        ),
    ]
}

/// One block per function: its description, then every outcome indented.
#[must_use]
pub fn detail_lines(report: &TestReport) -> Vec<ConsoleLine> {
    let mut lines = Vec::new();
    for entry in &report.entries {
        let stream = if entry.is_missing() {
            ConsoleStream::Warn
        } else {
            ConsoleStream::Log
        };
        lines.push(ConsoleLine::new(stream, entry.description.clone()));
        for outcome in &entry.outcomes {
            let stream = if outcome.verdict.is_pass() {
                ConsoleStream::Log
            } else {
                ConsoleStream::Error
            };
            lines.push(ConsoleLine::new(stream, format!("  {}", outcome.message)));
        }
    }
    lines
}

#[must_use]
pub fn console_lines(report: &TestReport, show_detail: bool) -> Vec<ConsoleLine> {
    let mut lines = summary_lines(report);
    if show_detail {
        lines.extend(detail_lines(report));
    }
    lines
}

/// Write `Log` lines to `out` and everything else to `err`.
pub fn write_console(
    lines: &[ConsoleLine],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> std::io::Result<()> {
    for line in lines {
        match line.stream {
            ConsoleStream::Log => writeln!(out, "{}", line.text)?,
            ConsoleStream::Warn | ConsoleStream::Error => writeln!(err, "{}", line.text)?,
        }
    }
    Ok(())
}

/// Result of testing one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub library: String,
    pub module_path: String,
    pub sha256: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub format_issues: Vec<FormatIssue>,
    pub report: TestReport,
}

/// Every suite of one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub campaign: String,
    pub timestamp: String,
    pub suites: Vec<SuiteReport>,
}

impl CampaignReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.suites.iter().map(|s| s.report.passed).sum()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.suites.iter().map(|s| s.report.failed).sum()
    }

    #[must_use]
    pub fn missing(&self) -> usize {
        self.suites.iter().map(|s| s.report.missing).sum()
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.suites.iter().all(|s| s.report.all_passed())
    }

    #[must_use]
    pub fn suite(&self, library: &str) -> Option<&SuiteReport> {
        self.suites.iter().find(|s| s.library == library)
    }

    /// Console output for every suite, each headed by its library name.
    #[must_use]
    pub fn console_lines(&self, show_detail: bool) -> Vec<ConsoleLine> {
        let mut lines = Vec::new();
        for suite in &self.suites {
            lines.push(ConsoleLine::new(
                ConsoleStream::Log,
                format!("Library '{}'", suite.library),
            ));
            lines.extend(console_lines(&suite.report, show_detail));
        }
        lines
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# Conformance: {}\n\n", self.campaign));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- Suites: {}\n", self.suites.len()));
        out.push_str(&format!("- Passed: {}\n", self.passed()));
        out.push_str(&format!("- Failed: {}\n", self.failed()));
        out.push_str(&format!("- Missing: {}\n", self.missing()));

        for suite in &self.suites {
            out.push_str(&format!("\n## {}\n\n", suite.library));
            out.push_str(&format!("- Module: `{}`\n", suite.module_path));
            out.push_str(&format!("- SHA-256: `{}`\n\n", suite.sha256));

            out.push_str("| Function | # | Status | Detail |\n");
            out.push_str("|----------|---|--------|--------|\n");
            for entry in &suite.report.entries {
                if entry.is_missing() {
                    out.push_str(&format!("| {} | - | MISSING | |\n", entry.function));
                    continue;
                }
                for (i, outcome) in entry.outcomes.iter().enumerate() {
                    let status = if outcome.verdict.is_pass() { "PASS" } else { "FAIL" };
                    out.push_str(&format!(
                        "| {} | {} | {} | {} |\n",
                        entry.function,
                        i,
                        status,
                        outcome.message.replace('|', "\\|")
                    ));
                }
            }

            if !suite.format_issues.is_empty() {
                out.push_str("\n### Fixture format issues\n\n");
                for issue in &suite.format_issues {
                    match issue.vector_index {
                        Some(i) => out.push_str(&format!("- {}[{i}]: {}\n", issue.key, issue.message)),
                        None => out.push_str(&format!("- {}: {}\n", issue.key, issue.message)),
                    }
                }
            }
        }
        out
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}
