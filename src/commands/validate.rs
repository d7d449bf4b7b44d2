use anyhow::Result;
use oaslint::loader::{DocumentLoader, ParseOptions};
use oaslint::result::ValidationResult;
use oaslint::rules::{RuleEngine, RuleRegistry};
use oaslint::ruleset::RulesetLoader;
use std::path::Path;
use tracing::info;

use super::output::{OutputFormat, print_result};

/// Returns whether the document passed: no errors and no faulted rules
pub fn validate_command(
    file: &Path,
    ruleset: Option<&Path>,
    format: OutputFormat,
    structure_check: bool,
) -> Result<bool> {
    let result = run(file, ruleset, structure_check)?;
    print_result(&result, format)?;
    Ok(!result.has_errors() && !result.has_failures())
}

fn run(
    file: &Path,
    ruleset: Option<&Path>,
    structure_check: bool,
) -> oaslint::Result<ValidationResult> {
    let loader = DocumentLoader::new(ParseOptions {
        validate_structure: structure_check,
    })?;
    let document = loader.load_file(file)?;

    let registry = RuleRegistry::builtin();
    let configs = match ruleset {
        Some(path) => RulesetLoader::new(&registry).load_from_file(path)?,
        None => registry.default_configs(),
    };

    let result = RuleEngine::new().validate(&document, &configs)?;
    info!("✓ Ran {} rule(s) on {}", configs.len(), document.location());
    Ok(result)
}
