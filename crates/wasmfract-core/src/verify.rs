//! Per-vector outcomes and per-module aggregation.

use serde::{Deserialize, Serialize};

use crate::compare::Verdict;

/// Result of running a single test vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub verdict: Verdict,
    /// `"<label>: <fn>(<inputs>) => [<actual>], expected [<expected>]"`.
    pub message: String,
}

impl TestOutcome {
    #[must_use]
    pub fn passed(&self) -> usize {
        usize::from(self.verdict.is_pass())
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        usize::from(!self.verdict.is_pass())
    }
}

/// Everything recorded for one exported function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEntry {
    pub function: String,
    /// `Test name: '<desc>'`, or a WARNING line when no descriptor exists.
    pub description: String,
    /// Empty when the function has no descriptor.
    pub outcomes: Vec<TestOutcome>,
    /// The function has no descriptor.
    #[serde(default)]
    pub missing: bool,
}

impl TestEntry {
    #[must_use]
    pub fn tested(
        function: impl Into<String>,
        description: impl Into<String>,
        outcomes: Vec<TestOutcome>,
    ) -> Self {
        Self {
            function: function.into(),
            description: description.into(),
            outcomes,
            missing: false,
        }
    }

    /// Entry for an export that has no descriptor.
    #[must_use]
    pub fn missing(function: &str) -> Self {
        Self {
            function: function.to_string(),
            description: format!("WARNING: No test found for exported WASM function '{function}'"),
            outcomes: Vec::new(),
            missing: true,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.missing
    }
}

/// Aggregate result of testing one module.
///
/// `passed + failed` always equals the number of outcomes across all entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub passed: usize,
    pub failed: usize,
    /// Function exports with no test descriptor.
    pub missing: usize,
    pub entries: Vec<TestEntry>,
}

impl TestReport {
    /// Rebuild counters from a list of entries.
    #[must_use]
    pub fn from_entries(entries: Vec<TestEntry>) -> Self {
        let mut report = Self::default();
        for entry in entries {
            report.push(entry);
        }
        report
    }

    /// Fold an entry into the counters.
    pub fn push(&mut self, entry: TestEntry) {
        if entry.is_missing() {
            self.missing += 1;
        }
        for outcome in &entry.outcomes {
            self.passed += outcome.passed();
            self.failed += outcome.failed();
        }
        self.entries.push(entry);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    /// True when nothing failed. Missing tests do not count as failures.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &TestOutcome)> {
        self.entries
            .iter()
            .flat_map(|e| e.outcomes.iter().map(move |o| (e.function.as_str(), o)))
    }
}
