use anyhow::{Context, Result};
use colored::Colorize;
use oaslint::result::ValidationResult;

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

pub fn print_result(result: &ValidationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_table(result),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(result)
                .context("Failed to serialize findings as JSON")?;
            println!("{json}");
        }
        OutputFormat::Yaml => {
            let yaml =
                serde_yaml::to_string(result).context("Failed to serialize findings as YAML")?;
            print!("{yaml}");
        }
    }
    Ok(())
}

fn print_table(result: &ValidationResult) {
    if result.is_empty() && !result.has_failures() {
        println!("{} No issues found", "✓".green());
        return;
    }

    let path_width = result
        .findings()
        .iter()
        .map(|f| f.path.len())
        .max()
        .unwrap_or(0);

    for finding in result.findings() {
        // escape codes break `{:<7}` on the colored label
        let padding = " ".repeat(7 - finding.severity.as_str().len());
        println!(
            "  {}{padding} {:<path_width$}  {}  {}",
            finding.severity.colored(),
            finding.path,
            finding.message,
            finding.rule.dimmed()
        );
    }

    for failure in result.failures() {
        println!("  {} {failure}", "fault  ".red().bold());
    }

    println!(
        "\n{} error(s), {} warning(s), {} info, {} rule fault(s)",
        result.errors().len(),
        result.warnings().len(),
        result.info().len(),
        result.failures().len()
    );
}
