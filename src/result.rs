//! Findings and their aggregation by severity

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RuleExecutionError;

/// Importance of a finding, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Label for terminal output
    pub fn colored(&self) -> colored::ColoredString {
        match self {
            Severity::Error => self.as_str().red().bold(),
            Severity::Warning => self.as_str().yellow().bold(),
            Severity::Info => self.as_str().blue(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(format!(
                "unknown severity '{other}' (expected error, warning or info)"
            )),
        }
    }
}

/// One reported issue, tagged with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: String,
    pub message: String,
    pub path: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    findings: Vec<Finding>,
    #[serde(skip)]
    errors: Vec<Finding>,
    #[serde(skip)]
    warnings: Vec<Finding>,
    #[serde(skip)]
    info: Vec<Finding>,
    /// Rules that faulted; kept apart from findings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<RuleExecutionError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Error => self.errors.push(finding.clone()),
            Severity::Warning => self.warnings.push(finding.clone()),
            Severity::Info => self.info.push(finding.clone()),
        }
        self.findings.push(finding);
    }

    pub fn add_failure(&mut self, failure: RuleExecutionError) {
        self.failures.push(failure);
    }

    /// All findings in the order they were reported
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn info(&self) -> &[Finding] {
        &self.info
    }

    pub fn failures(&self) -> &[RuleExecutionError] {
        &self.failures
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_info(&self) -> bool {
        !self.info.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty() && self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn findings_for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.rule == rule)
    }
}
