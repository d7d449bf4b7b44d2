use anyhow::{Result, anyhow};
use oaslint::document::Format;
use oaslint::loader::{DocumentLoader, ParseOptions};
use oaslint::resolver::{CircularPolicy, DereferenceOptions, dereference};
use std::path::Path;

/// Print the fully dereferenced document, in its source format unless overridden
pub fn dereference_command(
    file: &Path,
    output_format: Option<Format>,
    strict_cycles: bool,
) -> Result<()> {
    let options = DereferenceOptions {
        circular: if strict_cycles {
            CircularPolicy::Error
        } else {
            CircularPolicy::Preserve
        },
    };
    let document = run(file, options)?;

    let format = output_format.unwrap_or(document.format());
    let rendered = format
        .render(document.root())
        .map_err(|reason| anyhow!("Failed to render {format}: {reason}"))?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run(file: &Path, options: DereferenceOptions) -> oaslint::Result<oaslint::Document> {
    // Dereferencing is about references, not structure
    let loader = DocumentLoader::new(ParseOptions {
        validate_structure: false,
    })?;
    let document = loader.load_file(file)?;
    Ok(dereference(&document, options)?)
}
