use std::path::PathBuf;

use crate::document::{JsonPointer, PointerError};
use crate::error::ReferenceErrorKind;

/// A parsed `$ref` value: optional file part plus a pointer fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub file: Option<String>,
    pub pointer: JsonPointer,
}

impl Reference {
    /// Parse `#/a/b`, `common.yaml#/a/b` or `common.yaml`
    pub fn parse(raw: &str) -> Result<Self, ReferenceErrorKind> {
        let (file, fragment) = match raw.split_once('#') {
            Some((file, fragment)) => (file, fragment),
            None => (raw, ""),
        };

        if is_remote(file) {
            return Err(ReferenceErrorKind::ExternalFileUnreadable {
                path: PathBuf::from(file),
                reason: "remote references are not supported".to_string(),
            });
        }

        let fragment =
            urlencoding::decode(fragment).map_err(|e| ReferenceErrorKind::InvalidPointer {
                reason: format!("fragment '{fragment}' is not valid percent-encoding: {e}"),
            })?;
        let pointer = JsonPointer::parse(&fragment).map_err(|e| match e {
            PointerError::Invalid(reason) | PointerError::NotFound(reason) => {
                ReferenceErrorKind::InvalidPointer { reason }
            }
        })?;

        Ok(Self {
            file: (!file.is_empty()).then(|| file.to_string()),
            pointer,
        })
    }

    pub fn is_local(&self) -> bool {
        self.file.is_none()
    }
}

fn is_remote(file: &str) -> bool {
    file.contains("://") || file.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_reference() {
        let reference = Reference::parse("#/components/schemas/Pet").unwrap();
        assert!(reference.is_local());
        assert_eq!(reference.pointer.tokens(), &["components", "schemas", "Pet"]);
    }

    #[test]
    fn test_external_reference_with_and_without_fragment() {
        let reference = Reference::parse("shared/common.yaml#/Error").unwrap();
        assert_eq!(reference.file.as_deref(), Some("shared/common.yaml"));
        assert_eq!(reference.pointer.to_string(), "/Error");

        let whole = Reference::parse("common.json").unwrap();
        assert_eq!(whole.file.as_deref(), Some("common.json"));
        assert!(whole.pointer.is_root());
    }

    #[test]
    fn test_percent_encoded_fragment() {
        let reference = Reference::parse("#/paths/~1users~1%7Bid%7D").unwrap();
        assert_eq!(reference.pointer.tokens(), &["paths", "/users/{id}"]);
    }

    #[test]
    fn test_invalid_pointer() {
        assert!(matches!(
            Reference::parse("#components/schemas"),
            Err(ReferenceErrorKind::InvalidPointer { .. })
        ));
        assert!(matches!(
            Reference::parse("#/a~9"),
            Err(ReferenceErrorKind::InvalidPointer { .. })
        ));
    }

    #[test]
    fn test_remote_references_are_rejected() {
        assert!(matches!(
            Reference::parse("https://example.com/api.yaml#/Pet"),
            Err(ReferenceErrorKind::ExternalFileUnreadable { .. })
        ));
    }
}
