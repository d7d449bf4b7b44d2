use super::*;
use crate::document::Format;
use crate::result::ValidationResult;
use serde_json::{Value, json};

fn doc(root: Value) -> Document {
    Document::new(root, Format::Json)
}

fn run(rule: Box<dyn Rule>, document: &Document) -> ValidationResult {
    RuleEngine::new().run(document, &[RuleConfig::new(rule)])
}

fn described(paths: Value) -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {"title": "Pets", "version": "1.0.0", "description": "Pet store"},
        "paths": paths
    })
}

struct FailingRule;

impl Rule for FailingRule {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn description(&self) -> &'static str {
        "Reports once, then errors"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn evaluate(&self, _document: &Document, report: &mut Reporter) -> anyhow::Result<()> {
        report.report("partial finding", &NodePath::root());
        anyhow::bail!("lookup table missing")
    }
}

struct PanickingRule;

impl Rule for PanickingRule {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn description(&self) -> &'static str {
        "Always panics"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn evaluate(&self, _document: &Document, _report: &mut Reporter) -> anyhow::Result<()> {
        panic!("index out of bounds")
    }
}

#[test]
fn test_undeclared_path_parameter() {
    let document = doc(json!({
        "paths": {"/users/{id}": {"get": {"parameters": []}}}
    }));
    let result = run(Box::new(PathParametersRule), &document);

    assert_eq!(result.len(), 1);
    let finding = &result.findings()[0];
    assert_eq!(finding.rule, "path-parameters");
    assert_eq!(finding.path, "paths./users/{id}.get.parameters");
    assert_eq!(
        finding.message,
        "Path parameter 'id' found in path template but not defined in parameters"
    );
    assert_eq!(finding.severity, Severity::Warning);
}

#[test]
fn test_path_parameters_from_path_item_and_references() {
    let document = doc(json!({
        "paths": {
            "/users/{userId}/pets/{petId}": {
                "parameters": [{"name": "userId", "in": "path", "required": true}],
                "get": {
                    "parameters": [
                        {"$ref": "#/components/parameters/PetId"},
                        {"name": "limit", "in": "query"}
                    ]
                }
            }
        },
        "components": {
            "parameters": {"PetId": {"name": "petId", "in": "path", "required": true}}
        }
    }));
    let result = run(Box::new(PathParametersRule), &document);
    assert!(result.is_empty(), "{:?}", result.findings());
}

#[test]
fn test_path_parameter_missing_from_template() {
    let document = doc(json!({
        "paths": {
            "/users": {
                "post": {
                    "parameters": [
                        {"name": "limit", "in": "query"},
                        {"name": "id", "in": "path"}
                    ]
                }
            }
        }
    }));
    let result = run(Box::new(PathParametersRule), &document);

    assert_eq!(result.len(), 1);
    assert_eq!(result.findings()[0].path, "paths./users.post.parameters.1");
    assert_eq!(
        result.findings()[0].message,
        "Path parameter 'id' is defined in parameters but not found in path template"
    );
}

#[test]
fn test_undefined_security_scheme() {
    let document = doc(json!({"security": [{"Foo": []}]}));
    let result = run(Box::new(SecurityReferencesRule), &document);

    assert_eq!(result.len(), 1);
    let finding = &result.errors()[0];
    assert_eq!(finding.rule, "valid-security-references");
    assert_eq!(finding.path, "security.0.Foo");
    assert_eq!(
        finding.message,
        "Security scheme 'Foo' is not defined in components.securitySchemes."
    );
}

#[test]
fn test_operation_security_is_checked() {
    let document = doc(json!({
        "components": {"securitySchemes": {"ApiKey": {"type": "apiKey"}}},
        "security": [{"ApiKey": []}],
        "paths": {
            "/pets": {"get": {"security": [{}, {"ApiKey": [], "OAuth": ["read"]}]}}
        }
    }));
    let result = run(Box::new(SecurityReferencesRule), &document);

    assert_eq!(result.len(), 1);
    assert_eq!(result.findings()[0].path, "paths./pets.get.security.1.OAuth");
}

#[test]
fn test_empty_paths() {
    let document = doc(described(json!({})));
    let result = run(Box::new(RequiredFieldsRule), &document);

    assert_eq!(result.len(), 1);
    let finding = &result.findings()[0];
    assert_eq!(finding.rule, "required-fields");
    assert_eq!(finding.path, "paths");
    assert_eq!(
        finding.message,
        "Paths object should not be empty - API must define at least one path"
    );
    assert_eq!(finding.severity, Severity::Warning);
}

#[test]
fn test_required_fields_missing_metadata() {
    let document = doc(json!({"info": {"title": ""}, "paths": {"/a": {}}}));
    let result = run(Box::new(RequiredFieldsRule), &document);

    let errors: Vec<_> = result.errors().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(errors, vec!["openapi", "info.title", "info.version"]);
    let info: Vec<_> = result.info().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(info, vec!["info.description"]);
    assert!(!result.has_warnings());
}

#[test]
fn test_response_codes() {
    let document = doc(described(json!({
        "/pets": {
            "get": {
                "responses": {
                    "200": {}, "2XX": {}, "default": {}, "x-extra": {},
                    "600": {}, "2xx": {}, "ok": {}
                }
            },
            "delete": {}
        }
    })));
    let result = run(Box::new(ResponseCodesRule), &document);

    let errors: Vec<_> = result.errors().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        errors,
        vec![
            "paths./pets.get.responses.600",
            "paths./pets.get.responses.2xx",
            "paths./pets.get.responses.ok"
        ]
    );
    let warnings: Vec<_> = result.warnings().iter().map(|f| f.path.as_str()).collect();
    assert_eq!(warnings, vec!["paths./pets.delete.responses"]);
}

#[test]
fn test_configured_severity_applies_to_default_reports() {
    let document = doc(json!({"paths": {"/users/{id}": {"get": {}}}}));
    let configs = vec![RuleConfig::new(Box::new(PathParametersRule)).with_severity(Severity::Error)];
    let result = RuleEngine::new().run(&document, &configs);

    assert_eq!(result.errors().len(), 1);
    assert!(!result.has_warnings());
}

#[test]
fn test_faulting_rules_are_isolated() {
    let document = doc(json!({"security": [{"Foo": []}]}));
    let configs = vec![
        RuleConfig::new(Box::new(FailingRule)),
        RuleConfig::new(Box::new(PanickingRule)),
        RuleConfig::new(Box::new(SecurityReferencesRule)),
    ];
    let result = RuleEngine::new().run(&document, &configs);

    assert_eq!(result.len(), 1);
    assert_eq!(result.findings()[0].rule, "valid-security-references");
    assert_eq!(result.findings_for_rule("failing").count(), 0);

    let failures: Vec<_> = result
        .failures()
        .iter()
        .map(|f| (f.rule.as_str(), f.message.as_str()))
        .collect();
    assert_eq!(
        failures,
        vec![
            ("failing", "lookup table missing"),
            ("panicking", "panicked: index out of bounds")
        ]
    );
}

#[test]
fn test_disabled_config_is_skipped() {
    let document = doc(json!({"security": [{"Foo": []}]}));
    let mut config = RuleConfig::new(Box::new(SecurityReferencesRule));
    config.enabled = false;
    let result = RuleEngine::new().run(&document, &[config]);
    assert!(result.is_empty());
}

#[test]
fn test_findings_follow_rule_order_and_are_deterministic() {
    let document = doc(json!({
        "openapi": "3.0.3",
        "info": {"title": "Pets", "version": "1"},
        "security": [{"Foo": []}],
        "paths": {"/users/{id}": {"get": {"responses": {"200": {}}}}}
    }));
    let registry = RuleRegistry::builtin();
    let first = RuleEngine::new().run(&document, &registry.default_configs());
    let second = RuleEngine::new().run(&document, &registry.default_configs());

    assert_eq!(first, second);
    let rules: Vec<_> = first.findings().iter().map(|f| f.rule.as_str()).collect();
    assert_eq!(
        rules,
        vec!["required-fields", "path-parameters", "valid-security-references"]
    );
}

#[test]
fn test_registry_lists_builtin_rules() {
    let registry = RuleRegistry::builtin();
    assert_eq!(
        registry.names(),
        vec![
            "required-fields",
            "path-parameters",
            "response-codes",
            "valid-security-references"
        ]
    );
    let security = registry.get("valid-security-references").unwrap();
    assert_eq!(security.default_severity, Severity::Error);
    assert!(!security.description.is_empty());
    assert!(registry.create("no-such-rule").is_none());
}

#[test]
fn test_registry_rejects_duplicate_names() {
    fn failing() -> Box<dyn Rule> {
        Box::new(FailingRule)
    }

    let mut registry = RuleRegistry::builtin();
    registry.register(failing).unwrap();
    assert!(registry.register(failing).is_err());
    assert_eq!(registry.descriptors().len(), 5);
}
