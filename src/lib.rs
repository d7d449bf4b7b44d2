pub mod constraints;
pub mod document;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod result;
pub mod rules;
pub mod ruleset;

pub use document::{Document, Format, JsonPointer, NodePath};
pub use error::{Error, ParseError, ReferenceError, Result};
pub use loader::{DocumentLoader, ParseOptions};
pub use resolver::{CircularPolicy, DereferenceOptions, ReferenceResolver, dereference};
pub use result::{Finding, Severity, ValidationResult};
pub use rules::{Rule, RuleConfig, RuleEngine, RuleRegistry};
pub use ruleset::{RulesetLoader, RulesetSource};
