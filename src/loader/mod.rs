//! Reads API description files into `Document`s, running structural checks

use std::path::Path;
use tracing::{debug, info};

use crate::constraints::ConstraintValidator;
use crate::document::{Document, Format};
use crate::error::ParseError;

/// Per-session loading options
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Run the structural constraint validator while loading.
    /// Turning this off skips the schema pass entirely for large trusted inputs.
    pub validate_structure: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            validate_structure: true,
        }
    }
}

pub struct DocumentLoader {
    constraints: Option<ConstraintValidator>,
}

impl DocumentLoader {
    pub fn new(options: ParseOptions) -> Result<Self, ParseError> {
        let constraints = if options.validate_structure {
            Some(ConstraintValidator::openapi()?)
        } else {
            debug!("Structural validation disabled for this session");
            None
        };
        Ok(Self { constraints })
    }

    pub fn load_file(&self, path: &Path) -> Result<Document, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let format = Format::detect(Some(path), &content);
        debug!("Parsing {path:?} as {format}");

        let location = path.display().to_string();
        let document = self.parse(&content, format, &location)?.with_source(path);
        info!("✓ Loaded {location}");
        Ok(document)
    }

    /// Parse in-memory text; the format is sniffed when not given
    pub fn load_str(&self, content: &str, format: Option<Format>) -> Result<Document, ParseError> {
        let format = format.unwrap_or_else(|| Format::sniff(content));
        self.parse(content, format, "<inline document>")
    }

    fn parse(&self, content: &str, format: Format, location: &str) -> Result<Document, ParseError> {
        let root = format.parse(content).map_err(|reason| ParseError::Syntax {
            location: location.to_string(),
            reason,
        })?;

        if let Some(constraints) = &self.constraints {
            constraints
                .validate(&root, "")
                .map_err(|violation| ParseError::Constraints {
                    location: location.to_string(),
                    violation,
                })?;
            debug!("Structural validation passed for {location}");
        }

        Ok(Document::new(root, format))
    }
}
