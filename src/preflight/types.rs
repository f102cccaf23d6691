//! Preflight check types and report.

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - generation or build will fail.
    Fail,
}

impl CheckResult {
    pub fn pass_with(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Pass, Some(details))
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Fail, Some(details))
    }

    fn new(name: &str, status: CheckStatus, details: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.map(str::to_string),
        }
    }
}

/// Results of all preflight checks.
#[derive(Debug, Clone, Default)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Count of failed checks.
    pub fn fail_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    /// Failed checks, in the order they ran.
    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|c| c.status == CheckStatus::Fail)
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let (icon, label) = match check.status {
                CheckStatus::Pass => ("✓", "PASS"),
                CheckStatus::Fail => ("✗", "FAIL"),
            };

            match &check.details {
                Some(details) => println!("  {} [{}] {}: {}", icon, label, check.name, details),
                None => println!("  {} [{}] {}", icon, label, check.name),
            }
        }

        println!();
        let passed = self.count(CheckStatus::Pass);
        println!("Summary: {}/{} passed", passed, self.checks.len());
        if self.fail_count() > 0 {
            println!("         {} FAILED", self.fail_count());
        }
    }
}
