use super::{load_subsystem, report_warnings, write_document};
use crate::cli::ConvertArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use biosimi::core::models::document::SchemaVersion;
use biosimi::engine::diagnostics::Diagnostics;

pub fn run(args: ConvertArgs) -> Result<()> {
    let (level, version) = match &args.schema {
        Some(text) => parser::parse_schema(text).map_err(|e| CliError::Argument(e.to_string()))?,
        None => (SchemaVersion::LATEST.level, SchemaVersion::LATEST.version),
    };

    let mut subsystem = load_subsystem(&args.input)?;
    let mut diagnostics = Diagnostics::new();
    subsystem.convert_schema(level, version, &mut diagnostics)?;

    write_document(subsystem.document(), &args.output)?;
    report_warnings(diagnostics.warnings());
    println!(
        "✓ Model written as {} to: {}",
        subsystem.document().schema(),
        args.output.display()
    );
    Ok(())
}
