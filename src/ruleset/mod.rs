//! Ruleset configuration: which rules run and at what severity
//!
//! ```yaml
//! rules:
//!   path-parameters:
//!     severity: error
//!   valid-security-references:
//!     enabled: false
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::document::Format;
use crate::error::{Error, ParseError, UnknownRuleError};
use crate::result::Severity;
use crate::rules::{RuleConfig, RuleRegistry};

/// Settings for one rule entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleSettings {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }

    pub fn with_severity(severity: Severity) -> Self {
        Self {
            severity: Some(severity),
            ..Self::default()
        }
    }
}

/// Parsed ruleset; entries keep their configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesetConfig {
    pub name: Option<String>,
    pub rules: Vec<(String, RuleSettings)>,
}

impl RulesetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, name: impl Into<String>, settings: RuleSettings) -> Self {
        self.rules.push((name.into(), settings));
        self
    }

    /// Parse the `{rules: {<name>: {...}}}` shape from an already-decoded value
    pub fn from_value(value: &Value, location: &str) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::Ruleset {
            location: location.to_string(),
            reason,
        };

        let top = value
            .as_object()
            .ok_or_else(|| invalid("expected a mapping at the top level".to_string()))?;

        for key in top.keys() {
            if !matches!(key.as_str(), "rules" | "name" | "description") {
                return Err(invalid(format!("unexpected top-level key '{key}'")));
            }
        }

        let name = match top.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => return Err(invalid(format!("'name' must be a string, got {other}"))),
        };

        let rules = top
            .get("rules")
            .ok_or_else(|| invalid("missing 'rules' mapping".to_string()))?
            .as_object()
            .ok_or_else(|| invalid("'rules' must be a mapping of rule names".to_string()))?;

        let mut entries = Vec::with_capacity(rules.len());
        for (rule, raw) in rules {
            let settings = match raw {
                // `rule-name:` with no body keeps every default
                Value::Null => RuleSettings::default(),
                raw => serde_json::from_value(raw.clone())
                    .map_err(|e| invalid(format!("rules.{rule}: {e}")))?,
            };
            entries.push((rule.clone(), settings));
        }

        Ok(Self {
            name,
            rules: entries,
        })
    }
}

/// Where a ruleset comes from
#[derive(Debug, Clone)]
pub enum RulesetSource {
    File(PathBuf),
    Inline(RulesetConfig),
}

pub struct RulesetLoader<'a> {
    registry: &'a RuleRegistry,
}

impl<'a> RulesetLoader<'a> {
    pub fn new(registry: &'a RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn load(&self, source: &RulesetSource) -> Result<Vec<RuleConfig>, Error> {
        match source {
            RulesetSource::File(path) => self.load_from_file(path),
            RulesetSource::Inline(config) => self.load_config(config, "<inline ruleset>"),
        }
    }

    pub fn load_from_file(&self, path: &Path) -> Result<Vec<RuleConfig>, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let location = path.display().to_string();
        let value = Format::detect(Some(path), &content)
            .parse(&content)
            .map_err(|reason| ParseError::Ruleset {
                location: location.clone(),
                reason,
            })?;

        let config = RulesetConfig::from_value(&value, &location)?;
        let configs = self.load_config(&config, &location)?;
        info!(
            "✓ Loaded ruleset {} from {location} ({} rule(s) enabled)",
            config.name.as_deref().unwrap_or("(unnamed)"),
            configs.len()
        );
        Ok(configs)
    }

    /// Load from a raw decoded structure
    pub fn load_from_value(&self, value: &Value) -> Result<Vec<RuleConfig>, Error> {
        let location = "<inline ruleset>";
        let config = RulesetConfig::from_value(value, location)?;
        self.load_config(&config, location)
    }

    /// Build configs for the listed rules. Disabled entries are never constructed.
    pub fn load_config(
        &self,
        config: &RulesetConfig,
        location: &str,
    ) -> Result<Vec<RuleConfig>, Error> {
        let mut configs = Vec::new();

        for (name, settings) in &config.rules {
            let descriptor = self.registry.get(name).ok_or_else(|| UnknownRuleError {
                name: name.clone(),
                location: location.to_string(),
                available: self.registry.names(),
            })?;

            if !settings.is_enabled() {
                debug!("Rule {name} disabled by ruleset");
                continue;
            }

            let severity = settings.severity.unwrap_or(descriptor.default_severity);
            let config = RuleConfig::new(descriptor.create()).with_severity(severity);
            configs.push(match &settings.description {
                Some(description) => config.with_description(description.as_str()),
                None => config,
            });
        }

        Ok(configs)
    }
}
