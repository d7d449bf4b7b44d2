use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Reporter, Rule};
use crate::document::{Document, Operation};
use crate::result::Severity;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("Invalid regex"));

/// Cross-checks `{placeholder}` tokens in path templates against declared path parameters
pub struct PathParametersRule;

impl Rule for PathParametersRule {
    fn name(&self) -> &'static str {
        "path-parameters"
    }

    fn description(&self) -> &'static str {
        "Checks that every path template placeholder is declared as a path parameter and vice versa"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, document: &Document, report: &mut Reporter) -> anyhow::Result<()> {
        for operation in document.operations() {
            let placeholders = placeholders(operation.template);
            let declared = declared_path_parameters(document, &operation);
            let parameters_path = operation.path().key("parameters");

            for name in &placeholders {
                if !declared.iter().any(|(declared, _)| declared == name) {
                    report.report(
                        format!(
                            "Path parameter '{name}' found in path template but not defined in parameters"
                        ),
                        &parameters_path,
                    );
                }
            }

            // only the operation's own list has indices under this operation
            for (name, index) in declared {
                if let Some(index) = index {
                    if !placeholders.contains(&name) {
                        report.report(
                            format!(
                                "Path parameter '{name}' is defined in parameters but not found in path template"
                            ),
                            &parameters_path.index(index),
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for capture in PLACEHOLDER.captures_iter(template) {
        let name = capture[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// `in: path` parameter names with their index in the operation's own list;
/// path-item level parameters carry no index
fn declared_path_parameters(
    document: &Document,
    operation: &Operation<'_>,
) -> Vec<(String, Option<usize>)> {
    let mut declared = Vec::new();

    let mut collect = |list: Option<&Value>, own: bool| {
        let Some(items) = list.and_then(Value::as_array) else {
            return;
        };
        for (index, parameter) in items.iter().enumerate() {
            let parameter = document.follow(parameter);
            if parameter.get("in").and_then(Value::as_str) != Some("path") {
                continue;
            }
            if let Some(name) = parameter.get("name").and_then(Value::as_str) {
                declared.push((name.to_string(), own.then_some(index)));
            }
        }
    };

    collect(operation.path_item.get("parameters"), false);
    collect(operation.operation.get("parameters"), true);
    declared
}
