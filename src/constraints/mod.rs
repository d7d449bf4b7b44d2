//! Field-level constraint checking backed by JSON Schema
//!
//! The checks themselves (required, type, length, pattern) are delegated to
//! the `jsonschema` crate; this module only maps its errors onto dotted field
//! paths and bundles every violation into one `ConstraintViolation`.

use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use tracing::debug;

use crate::document::{JsonPointer, NodePath};
use crate::error::{ConstraintViolation, ParseError};

// Use JSON Schema draft-07 for validation
use jsonschema::draft7 as schema_draft;

const OPENAPI_STRUCTURE_SCHEMA: &str = include_str!("../../schemas/v1/openapi-structure.json");

pub fn get_openapi_structure_schema() -> Result<Value, serde_json::Error> {
    serde_json::from_str(OPENAPI_STRUCTURE_SCHEMA)
}

pub struct ConstraintValidator {
    validator: jsonschema::Validator,
}

impl ConstraintValidator {
    /// Compile a validator from a set of field rules expressed as a JSON Schema
    pub fn new(field_rules: &Value) -> Result<Self, ParseError> {
        let validator =
            schema_draft::new(field_rules).map_err(|e| ParseError::Syntax {
                location: "field rules".to_string(),
                reason: format!("Failed to compile schema: {e}"),
            })?;
        Ok(Self { validator })
    }

    /// Validator for the structural skeleton of an OpenAPI 3.x document
    pub fn openapi() -> Result<Self, ParseError> {
        let schema = get_openapi_structure_schema().map_err(|e| ParseError::Syntax {
            location: "embedded OpenAPI structure schema".to_string(),
            reason: e.to_string(),
        })?;
        Self::new(&schema)
    }

    /// Check `raw` and collect every violation, keyed by field path under `path_prefix`
    pub fn validate(&self, raw: &Value, path_prefix: &str) -> Result<(), ConstraintViolation> {
        let mut violation = ConstraintViolation::default();

        for error in self.validator.iter_errors(raw) {
            let field = field_path(&error, path_prefix);
            debug!("Constraint violated at {field}: {error}");
            violation.add(field, error.to_string());
        }

        if violation.is_empty() {
            Ok(())
        } else {
            Err(violation)
        }
    }
}

/// Check `raw` against `field_rules` in one call
pub fn validate(raw: &Value, field_rules: &Value, path_prefix: &str) -> Result<(), ParseError> {
    ConstraintValidator::new(field_rules)?
        .validate(raw, path_prefix)
        .map_err(|violation| ParseError::Constraints {
            location: if path_prefix.is_empty() {
                "document".to_string()
            } else {
                path_prefix.to_string()
            },
            violation,
        })
}

/// Dotted path of the offending field; for missing properties this names the
/// property itself rather than its parent object
fn field_path(error: &jsonschema::ValidationError<'_>, path_prefix: &str) -> String {
    let mut path = JsonPointer::parse(&error.instance_path.to_string())
        .map(|pointer| NodePath::from(&pointer))
        .unwrap_or_default();

    if let ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            path = path.key(name);
        }
    }

    let path = path.to_string();
    match (path_prefix.is_empty(), path.is_empty()) {
        (true, true) => "(root)".to_string(),
        (true, false) => path,
        (false, true) => path_prefix.to_string(),
        (false, false) => format!("{path_prefix}.{path}"),
    }
}
