use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Reporter, Rule};
use crate::document::Document;
use crate::result::Severity;

/// `100`-`599`, a range such as `2XX`, or `default`
static RESPONSE_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[1-5][0-9]{2}|[1-5]XX|default)$").expect("Invalid regex"));

pub struct ResponseCodesRule;

impl Rule for ResponseCodesRule {
    fn name(&self) -> &'static str {
        "response-codes"
    }

    fn description(&self) -> &'static str {
        "Checks that response keys are valid HTTP status codes, status ranges or 'default'"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, document: &Document, report: &mut Reporter) -> anyhow::Result<()> {
        for operation in document.operations() {
            let responses_path = operation.path().key("responses");
            let responses = operation
                .operation
                .get("responses")
                .map(|responses| document.follow(responses))
                .and_then(Value::as_object);

            let Some(responses) = responses.filter(|r| !r.is_empty()) else {
                report.report_with(
                    "Operation should define at least one response",
                    &responses_path,
                    Severity::Warning,
                );
                continue;
            };

            for code in responses.keys() {
                if code.starts_with("x-") {
                    continue;
                }
                if !RESPONSE_KEY.is_match(code) {
                    report.report(
                        format!(
                            "Invalid response code '{code}' - must be an HTTP status code (100-599), a range like '2XX', or 'default'"
                        ),
                        &responses_path.key(code.as_str()),
                    );
                }
            }
        }
        Ok(())
    }
}
