use serde_json::Value;

use super::{Reporter, Rule};
use crate::document::{Document, NodePath};
use crate::result::Severity;

/// Presence and best-practice checks on the top-level sections
pub struct RequiredFieldsRule;

impl Rule for RequiredFieldsRule {
    fn name(&self) -> &'static str {
        "required-fields"
    }

    fn description(&self) -> &'static str {
        "Checks that required top-level fields are present and recommended ones are filled in"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, document: &Document, report: &mut Reporter) -> anyhow::Result<()> {
        let root = document.root();
        let at = NodePath::root();

        if root.get("openapi").is_none() {
            report.report_with(
                "Missing required field 'openapi' - the document must declare its OpenAPI version",
                &at.key("openapi"),
                Severity::Error,
            );
        }

        match root.get("info") {
            None => report.report_with(
                "Missing required field 'info' - API metadata must be provided",
                &at.key("info"),
                Severity::Error,
            ),
            Some(info) => {
                let info_path = at.key("info");
                for field in ["title", "version"] {
                    if is_blank(info.get(field)) {
                        report.report_with(
                            format!("Missing required field 'info.{field}'"),
                            &info_path.key(field),
                            Severity::Error,
                        );
                    }
                }
                if is_blank(info.get("description")) {
                    report.report_with(
                        "API description is recommended - add 'info.description' to document the API",
                        &info_path.key("description"),
                        Severity::Info,
                    );
                }
            }
        }

        if let Some(paths) = root.get("paths").and_then(Value::as_object) {
            if paths.is_empty() {
                report.report(
                    "Paths object should not be empty - API must define at least one path",
                    &at.key("paths"),
                );
            }
        }

        Ok(())
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}
