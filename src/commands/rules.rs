use anyhow::Result;
use colored::Colorize;
use oaslint::rules::{RuleConfig, RuleRegistry};
use oaslint::ruleset::RulesetLoader;
use std::path::Path;

/// List rules at their defaults, or the effective set a ruleset selects
pub fn rules_command(ruleset: Option<&Path>) -> Result<()> {
    let registry = RuleRegistry::builtin();
    let configs = load(&registry, ruleset)?;
    let width = configs.iter().map(|c| c.name().len()).max().unwrap_or(0);

    println!("Rules:");
    if configs.is_empty() {
        println!("  (none enabled)");
    }
    for config in &configs {
        let padding = " ".repeat(7 - config.severity.as_str().len());
        println!(
            "  {}  {}{padding}  {}",
            format!("{:<width$}", config.name()).bold(),
            config.severity.colored(),
            config.description()
        );
    }
    Ok(())
}

fn load(registry: &RuleRegistry, ruleset: Option<&Path>) -> oaslint::Result<Vec<RuleConfig>> {
    match ruleset {
        Some(path) => RulesetLoader::new(registry).load_from_file(path),
        None => Ok(registry.default_configs()),
    }
}
