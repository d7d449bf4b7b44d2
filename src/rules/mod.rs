//! Pluggable validation rules and the registry that names them

mod engine;
mod path_parameters;
mod required_fields;
mod response_codes;
mod security_references;

#[cfg(test)]
mod tests;

pub use engine::RuleEngine;
pub use path_parameters::PathParametersRule;
pub use required_fields::RequiredFieldsRule;
pub use response_codes::ResponseCodesRule;
pub use security_references::SecurityReferencesRule;

use crate::document::{Document, NodePath};
use crate::result::{Finding, Severity};

/// A named check evaluated against a whole document
pub trait Rule {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn default_severity(&self) -> Severity;

    /// Inspect `document` and report findings. Returning an error marks the
    /// rule as faulted; whatever it reported is dropped.
    fn evaluate(&self, document: &Document, report: &mut Reporter) -> anyhow::Result<()>;
}

/// Collects findings for one rule run
pub struct Reporter {
    rule: String,
    severity: Severity,
    findings: Vec<Finding>,
}

impl Reporter {
    pub fn new(rule: &str, severity: Severity) -> Self {
        Self {
            rule: rule.to_string(),
            severity,
            findings: Vec::new(),
        }
    }

    /// Report at the rule's configured severity
    pub fn report(&mut self, message: impl Into<String>, path: &NodePath) {
        self.report_with(message, path, self.severity);
    }

    /// Report with an explicit severity override
    pub fn report_with(&mut self, message: impl Into<String>, path: &NodePath, severity: Severity) {
        self.findings.push(Finding {
            rule: self.rule.clone(),
            message: message.into(),
            path: path.to_string(),
            severity,
        });
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// The unit the engine executes: a rule plus its effective settings
pub struct RuleConfig {
    pub rule: Box<dyn Rule>,
    pub severity: Severity,
    pub enabled: bool,
    /// Ruleset-supplied description replacing the rule's own
    description: Option<String>,
}

impl RuleConfig {
    pub fn new(rule: Box<dyn Rule>) -> Self {
        let severity = rule.default_severity();
        Self {
            rule,
            severity,
            enabled: true,
            description: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.rule.name()
    }

    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or_else(|| self.rule.description())
    }
}

impl std::fmt::Debug for RuleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleConfig")
            .field("rule", &self.rule.name())
            .field("severity", &self.severity)
            .field("enabled", &self.enabled)
            .field("description", &self.description())
            .finish()
    }
}

pub type RuleFactory = fn() -> Box<dyn Rule>;

/// Registry entry, filled in once from an instance the factory produced
#[derive(Debug, Clone)]
pub struct RuleDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub default_severity: Severity,
    factory: RuleFactory,
}

impl RuleDescriptor {
    pub fn create(&self) -> Box<dyn Rule> {
        (self.factory)()
    }
}

fn required_fields() -> Box<dyn Rule> {
    Box::new(RequiredFieldsRule)
}

fn path_parameters() -> Box<dyn Rule> {
    Box::new(PathParametersRule)
}

fn response_codes() -> Box<dyn Rule> {
    Box::new(ResponseCodesRule)
}

fn security_references() -> Box<dyn Rule> {
    Box::new(SecurityReferencesRule)
}

const BUILTIN_RULES: &[RuleFactory] = &[
    required_fields,
    path_parameters,
    response_codes,
    security_references,
];

/// Name to factory table; registration order is listing order
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    entries: Vec<RuleDescriptor>,
}

impl RuleRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registry holding every built-in rule
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for factory in BUILTIN_RULES {
            // built-in names are distinct
            let _ = registry.register(*factory);
        }
        registry
    }

    /// Add a rule; fails when the name is already taken
    pub fn register(&mut self, factory: RuleFactory) -> anyhow::Result<()> {
        let rule = factory();
        if self.get(rule.name()).is_some() {
            anyhow::bail!("Rule '{}' is already registered", rule.name());
        }
        self.entries.push(RuleDescriptor {
            name: rule.name(),
            description: rule.description(),
            default_severity: rule.default_severity(),
            factory,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RuleDescriptor> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Rule>> {
        self.get(name).map(RuleDescriptor::create)
    }

    pub fn descriptors(&self) -> &[RuleDescriptor] {
        &self.entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.to_string()).collect()
    }

    /// Every registered rule, enabled at its default severity
    pub fn default_configs(&self) -> Vec<RuleConfig> {
        self.entries
            .iter()
            .map(|entry| RuleConfig::new(entry.create()))
            .collect()
    }
}
