//! Error taxonomy shared by the loader, resolver, ruleset loader and rule engine

use miette::Diagnostic;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnknownRule(#[from] UnknownRuleError),
}

/// Malformed source documents or ruleset configuration
#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", .path.display())]
    #[diagnostic(code(oaslint::parse::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {location}: {reason}")]
    #[diagnostic(code(oaslint::parse::syntax))]
    Syntax { location: String, reason: String },

    #[error("{location} failed structural validation:\n{violation}")]
    #[diagnostic(
        code(oaslint::parse::constraints),
        help("Fix every listed field; all violations are reported in one pass")
    )]
    Constraints {
        location: String,
        violation: ConstraintViolation,
    },

    #[error("Invalid ruleset {location}: {reason}")]
    #[diagnostic(code(oaslint::parse::ruleset))]
    Ruleset { location: String, reason: String },
}

/// Field-level violations collected by the constraint validator, keyed by dotted field path
#[derive(Error, Debug, Diagnostic, Clone, Default, PartialEq, Eq)]
#[error("{}", render_fields(.fields))]
#[diagnostic(code(oaslint::constraint_violation))]
pub struct ConstraintViolation {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ConstraintViolation {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }
}

fn render_fields(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("  - {field}: {message}"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A reference that could not be turned into exactly one target node
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("Cannot resolve reference '{reference}' at {at}: {kind}")]
#[diagnostic(code(oaslint::reference))]
pub struct ReferenceError {
    /// The reference string as written in the document
    pub reference: String,
    /// Location of the `$ref` occurrence (`<file>#<pointer>`)
    pub at: String,
    pub kind: ReferenceErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceErrorKind {
    #[error("no node at '{pointer}' in {document}")]
    NotFound { document: String, pointer: String },

    #[error("invalid pointer: {reason}")]
    InvalidPointer { reason: String },

    #[error("cannot read external file {}: {reason}", .path.display())]
    ExternalFileUnreadable { path: PathBuf, reason: String },

    #[error("circular reference: {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },
}

/// A rule faulted while evaluating; recorded on the result, never raised
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq, Serialize)]
#[error("Rule '{rule}' failed: {message}")]
#[diagnostic(code(oaslint::rule_execution))]
pub struct RuleExecutionError {
    pub rule: String,
    pub message: String,
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
#[error("Unknown rule '{name}' in ruleset {location} (available rules: {})", .available.join(", "))]
#[diagnostic(code(oaslint::unknown_rule))]
pub struct UnknownRuleError {
    pub name: String,
    pub location: String,
    pub available: Vec<String>,
}
