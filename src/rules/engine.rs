use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

use super::{Reporter, RuleConfig};
use crate::document::Document;
use crate::error::{ReferenceError, RuleExecutionError};
use crate::resolver::{DereferenceOptions, dereference};
use crate::result::ValidationResult;

/// Runs rule configs against one document snapshot
#[derive(Debug, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Dereference `document` in a fresh session, then run the configs over the
    /// result so nodes reached through other files are checked as well.
    ///
    /// Every `$ref` slot is replaced in place, so finding paths still address
    /// the source document. A broken reference fails before any rule runs.
    pub fn validate(
        &self,
        document: &Document,
        configs: &[RuleConfig],
    ) -> Result<ValidationResult, ReferenceError> {
        let resolved = dereference(document, DereferenceOptions::default())?;
        debug!("References resolved for {}", document.location());
        Ok(self.run(&resolved, configs))
    }

    /// Evaluate every enabled config in list order. A rule that errors or
    /// panics is recorded as a failure and the remaining rules still run.
    pub fn run(&self, document: &Document, configs: &[RuleConfig]) -> ValidationResult {
        let mut result = ValidationResult::new();

        for config in configs.iter().filter(|config| config.enabled) {
            let name = config.name();
            debug!("Running rule {name} at severity {}", config.severity);

            let mut reporter = Reporter::new(name, config.severity);
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                config.rule.evaluate(document, &mut reporter)
            }));

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some(format!("{error:#}")),
                Err(payload) => Some(panic_message(payload.as_ref())),
            };

            match failure {
                None => {
                    let findings = reporter.into_findings();
                    debug!("  {name}: {} finding(s)", findings.len());
                    for finding in findings {
                        result.add(finding);
                    }
                }
                Some(message) => {
                    warn!("Rule {name} failed: {message}");
                    result.add_failure(RuleExecutionError {
                        rule: name.to_string(),
                        message,
                    });
                }
            }
        }

        result
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
