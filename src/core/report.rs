//! Collected validation outcomes.
//!
//! The suite records every check it runs, pass or fail, instead of stopping at
//! the first failure. A scenario with a broken service file and a wrong port
//! reports both problems in one run.

use std::fmt;

/// One named assertion against the target host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Check {
    /// What was checked, e.g. `odl user home directory`.
    pub name: String,

    /// The expected state, rendered for humans.
    pub expected: String,

    /// The observed state, rendered for humans.
    pub actual: String,

    pub passed: bool,
}

impl Check {
    pub fn new(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        passed: bool,
    ) -> Self {
        Check {
            name: name.into(),
            expected: expected.into(),
            actual: actual.into(),
            passed,
        }
    }

    /// A check that passes when expected and actual render identically.
    pub fn eq(
        name: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        let expected = expected.to_string();
        let actual = actual.to_string();
        let passed = expected == actual;
        Check::new(name, expected, actual, passed)
    }

    /// A check that a file's content matches `pattern`.
    pub fn content(name: impl Into<String>, pattern: &str, matched: bool) -> Self {
        Check::new(
            name,
            format!("content matching {pattern}"),
            match matched {
                true => "match",
                false => "no match",
            },
            matched,
        )
    }

    /// A check that a file's content does *not* match `pattern`.
    pub fn content_absent(name: impl Into<String>, pattern: &str, matched: bool) -> Self {
        Check::new(
            name,
            format!("no content matching {pattern}"),
            match matched {
                true => "match",
                false => "no match",
            },
            !matched,
        )
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.passed {
            true => write!(f, "ok   {}", self.name),
            false => write!(
                f,
                "FAIL {}: expected {}, got {}",
                self.name, self.expected, self.actual,
            ),
        }
    }
}

/// Every [Check] recorded while validating one host, in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    checks: Vec<Check>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Whether every recorded check passed.
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// The checks that failed, in execution order.
    pub fn failures(&self) -> Vec<&Check> {
        self.checks.iter().filter(|check| !check.passed).collect()
    }

    /// Looks up a check by name. Handy in tests; names are unique per run.
    pub fn find(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|check| check.name == name)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for check in &self.checks {
            writeln!(f, "{check}")?;
        }
        let failed = self.failures().len();
        write!(f, "{} checks, {} failed", self.checks.len(), failed)
    }
}
