use serde_json::Value;

use super::{Reporter, Rule};
use crate::document::{Document, NodePath};
use crate::result::Severity;

/// Security requirements must name schemes declared under `components.securitySchemes`
pub struct SecurityReferencesRule;

impl Rule for SecurityReferencesRule {
    fn name(&self) -> &'static str {
        "valid-security-references"
    }

    fn description(&self) -> &'static str {
        "Checks that security requirements only reference defined security schemes"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, document: &Document, report: &mut Reporter) -> anyhow::Result<()> {
        let schemes = document
            .root()
            .get("components")
            .and_then(|components| components.get("securitySchemes"))
            .and_then(Value::as_object);
        let is_defined = |name: &str| schemes.is_some_and(|schemes| schemes.contains_key(name));

        let mut requirements = vec![(
            NodePath::root().key("security"),
            document.root().get("security"),
        )];
        for operation in document.operations() {
            requirements.push((
                operation.path().key("security"),
                operation.operation.get("security"),
            ));
        }

        for (path, security) in requirements {
            let Some(entries) = security.and_then(Value::as_array) else {
                continue;
            };
            for (index, requirement) in entries.iter().enumerate() {
                let Some(requirement) = requirement.as_object() else {
                    continue;
                };
                for name in requirement.keys() {
                    if !is_defined(name) {
                        report.report(
                            format!(
                                "Security scheme '{name}' is not defined in components.securitySchemes."
                            ),
                            &path.index(index).key(name.as_str()),
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
