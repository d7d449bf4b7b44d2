use anyhow::Result;
use oaslint::loader::{DocumentLoader, ParseOptions};
use oaslint::resolver::ReferenceGraph;
use std::path::Path;

pub fn cycles_command(file: &Path) -> Result<()> {
    let graph = build(file)?;
    let cycles = graph.cycles();

    if cycles.is_empty() {
        println!(
            "No reference cycles ({} reference target(s) checked)",
            graph.target_count()
        );
        return Ok(());
    }

    println!("Reference cycles:");
    for (index, members) in cycles.iter().enumerate() {
        println!("  {}. {}", index + 1, members.join(", "));
    }
    Ok(())
}

fn build(file: &Path) -> oaslint::Result<ReferenceGraph> {
    let loader = DocumentLoader::new(ParseOptions {
        validate_structure: false,
    })?;
    let document = loader.load_file(file)?;
    Ok(ReferenceGraph::build(&document)?)
}
